use super::loader::{parse_str, LoadError};
use super::model::RecordSet;
use super::normalize::normalize;
use crate::config::DashboardConfig;

/// Ten sites in the canonical layout, shown when the real file is unavailable
/// and the configuration allows it.
pub const SAMPLE_CSV: &str = "\
MNC,Cell_ID,Latitude,Longitude,Gen
60,50822,9.0117,7.6197,2G
60,7301,6.6567,3.2988,2G
60,2917,6.7018,3.2450,2G
30,24441,4.9401,6.3365,2G
30,24663,4.9487,6.3516,2G
50,1011,6.5244,3.3792,3G
50,1012,6.4531,3.3958,3G
2,2022,6.6018,3.3515,4G
30,3033,9.0765,7.3986,4G
30,3044,7.3775,3.9470,4G
";

pub fn sample_dataset(config: &DashboardConfig) -> Result<RecordSet, LoadError> {
    // The embedded sample is always comma separated.
    let config = DashboardConfig {
        delimiter: ',',
        ..config.clone()
    };
    Ok(normalize(parse_str(SAMPLE_CSV, &config)?, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_normalizes_without_drops() {
        let config = DashboardConfig {
            delimiter: ';',
            ..DashboardConfig::default()
        };
        let dataset = sample_dataset(&config).unwrap();
        assert_eq!(dataset.len(), 10);
        assert_eq!(dataset.dropped_rows, 0);
        assert_eq!(
            dataset.operators.iter().collect::<Vec<_>>(),
            ["9mobile", "Airtel", "Glo", "MTN"]
        );
        assert_eq!(dataset.generations.iter().collect::<Vec<_>>(), ["2G", "3G", "4G"]);
    }
}
