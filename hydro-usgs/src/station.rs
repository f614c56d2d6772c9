use crate::error::{HydroError, ParseErrorKind, Result};
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};

/// Color used for a station with no styling entry.
pub const DEFAULT_COLOR: &str = "black";

/// Marker used for a station with no styling entry.
pub const DEFAULT_MARKER: &str = "o";

/// Display settings for a gauging station, handed to whatever renders the
/// derived series.
///
/// Loaded from a fixture with headers `KEY,NAME,DAILY_FILE,COLOR,MARKER`:
///
/// ```text
/// KEY,NAME,DAILY_FILE,COLOR,MARKER
/// Wildcat,Wildcat Creek,WildcatCreek_Discharge_03335000_19540601-20200315.txt,red,*
/// ```
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StationStyle {
    /// Identifier matching the `Station` column of the metric tables
    pub key: String,
    /// Full river name used in legends
    pub display_name: String,
    /// Daily discharge file for the station
    pub daily_file: String,
    pub color: String,
    pub marker: String,
}

impl StationStyle {
    /// Parse a CSV string of station styles into a vector of StationStyles.
    ///
    /// The color and marker columns may be blank and fall back to defaults.
    pub fn parse_station_csv(origin: &str, csv_object: &str) -> Result<Vec<StationStyle>> {
        let mut station_list: Vec<StationStyle> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row.map_err(|source| HydroError::Csv {
                origin: origin.to_string(),
                source,
            })?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or_default();
            let required = |index: usize, name: &str| -> Result<String> {
                match record.get(index) {
                    Some(value) if !value.is_empty() => Ok(value.to_string()),
                    _ => Err(HydroError::parse(
                        origin,
                        line,
                        ParseErrorKind::MissingColumn(name.to_string()),
                    )),
                }
            };
            let or_default = |index: usize, default: &str| -> String {
                match record.get(index) {
                    Some(value) if !value.is_empty() => value.to_string(),
                    _ => default.to_string(),
                }
            };
            let station = StationStyle {
                key: required(0, "KEY")?,
                display_name: required(1, "NAME")?,
                daily_file: required(2, "DAILY_FILE")?,
                color: or_default(3, DEFAULT_COLOR),
                marker: or_default(4, DEFAULT_MARKER),
            };
            station_list.push(station);
        }
        Ok(station_list)
    }
}

#[cfg(test)]
mod tests {
    use super::StationStyle;
    use crate::error::ParseErrorKind;

    #[test]
    fn test_parse_station_csv() {
        let csv_data = "\
KEY,NAME,DAILY_FILE,COLOR,MARKER
Wildcat,Wildcat Creek,WildcatCreek_Discharge_03335000_19540601-20200315.txt,red,*
Tippe,Tippecanoe River,TippecanoeRiver_Discharge_03331500_19431001-20200315.txt,green,o
";
        let stations = StationStyle::parse_station_csv("stations.csv", csv_data).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].key, "Wildcat");
        assert_eq!(stations[0].display_name, "Wildcat Creek");
        assert_eq!(stations[0].color, "red");
        assert_eq!(stations[0].marker, "*");
        assert_eq!(stations[1].display_name, "Tippecanoe River");
        assert_eq!(stations[1].color, "green");
    }

    #[test]
    fn test_blank_style_columns_use_defaults() {
        let csv_data = "KEY,NAME,DAILY_FILE,COLOR,MARKER\nEel,Eel River,eel.txt\n";
        let stations = StationStyle::parse_station_csv("stations.csv", csv_data).unwrap();
        assert_eq!(stations[0].color, super::DEFAULT_COLOR);
        assert_eq!(stations[0].marker, super::DEFAULT_MARKER);
    }

    #[test]
    fn test_missing_daily_file() {
        let csv_data = "KEY,NAME,DAILY_FILE,COLOR,MARKER\nEel,Eel River,,blue,x\n";
        let err = StationStyle::parse_station_csv("stations.csv", csv_data).unwrap_err();
        assert_eq!(
            err.parse_kind(),
            Some(&ParseErrorKind::MissingColumn("DAILY_FILE".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_csv() {
        let csv_data = "KEY,NAME,DAILY_FILE,COLOR,MARKER\n";
        let stations = StationStyle::parse_station_csv("stations.csv", csv_data).unwrap();
        assert_eq!(stations.len(), 0);
    }
}
