/// Data layer: decoding, normalization, filtering, sampling and export.
///
/// Architecture:
/// ```text
///  .csv (utf-8 / latin-1 / cp1252)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  try encodings → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  rename headers, coerce coords, derive Operator → RecordSet
///   └───────────┘
///        │            (memoized by `cache`)
///        ▼
///   ┌──────────┐
///   │  filter   │  operator × generation → RecordView
///   └──────────┘
///        │
///        ├──► sample  (bounded map points)
///        └──► export  (UTF-8 CSV)
/// ```

pub mod cache;
pub mod encoding;
pub mod export;
pub mod fallback;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod sample;
