//! WMO weather interpretation codes → human-readable conditions.
//!
//! Open-Meteo reports current conditions as a numeric WMO code. The
//! mapping below groups codes into the documented semantic buckets;
//! anything outside the table is "Unknown".

/// Map a WMO weather interpretation code to its condition label.
pub fn condition_for_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1..=3 => "Mainly clear, partly cloudy, and overcast",
        45 | 48 => "Fog and depositing rime fog",
        51 | 53 | 55 => "Drizzle: Light, moderate, and dense intensity",
        56 | 57 => "Freezing Drizzle: Light and dense intensity",
        61 | 63 | 65 => "Rain: Slight, moderate and heavy intensity",
        66 | 67 => "Freezing Rain: Light and heavy intensity",
        71 | 73 | 75 => "Snow fall: Slight, moderate, and heavy intensity",
        77 => "Snow grains",
        80..=82 => "Rain showers: Slight, moderate, and violent",
        85 | 86 => "Snow showers slight and heavy",
        95 => "Thunderstorm: Slight or moderate",
        96 | 99 => "Thunderstorm with slight and heavy hail",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sky_is_code_zero() {
        assert_eq!(condition_for_code(0), "Clear sky");
    }

    #[test]
    fn grouped_codes_share_a_label() {
        for code in [1, 2, 3] {
            assert_eq!(
                condition_for_code(code),
                "Mainly clear, partly cloudy, and overcast"
            );
        }
        for code in [61, 63, 65] {
            assert_eq!(
                condition_for_code(code),
                "Rain: Slight, moderate and heavy intensity"
            );
        }
        for code in [80, 81, 82] {
            assert_eq!(
                condition_for_code(code),
                "Rain showers: Slight, moderate, and violent"
            );
        }
    }

    #[test]
    fn every_table_code_maps_to_its_bucket() {
        let table: &[(&[i32], &str)] = &[
            (&[0], "Clear sky"),
            (&[1, 2, 3], "Mainly clear, partly cloudy, and overcast"),
            (&[45, 48], "Fog and depositing rime fog"),
            (&[51, 53, 55], "Drizzle: Light, moderate, and dense intensity"),
            (&[56, 57], "Freezing Drizzle: Light and dense intensity"),
            (&[61, 63, 65], "Rain: Slight, moderate and heavy intensity"),
            (&[66, 67], "Freezing Rain: Light and heavy intensity"),
            (&[71, 73, 75], "Snow fall: Slight, moderate, and heavy intensity"),
            (&[77], "Snow grains"),
            (&[80, 81, 82], "Rain showers: Slight, moderate, and violent"),
            (&[85, 86], "Snow showers slight and heavy"),
            (&[95], "Thunderstorm: Slight or moderate"),
            (&[96, 99], "Thunderstorm with slight and heavy hail"),
        ];
        for (codes, label) in table {
            for code in *codes {
                assert_eq!(condition_for_code(*code), *label, "code {}", code);
            }
        }
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        for code in [-1, 4, 44, 50, 60, 70, 90, 100, 255] {
            assert_eq!(condition_for_code(code), "Unknown", "code {}", code);
        }
    }
}
