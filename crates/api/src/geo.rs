//! ZIP centroid lookup and great-circle math backing the location
//! endpoints, employer registration, and nearby-job search.

const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Clone, Copy, Debug)]
pub struct ZipRecord {
    pub zip: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Curated centroid table for major US markets. Enough coverage for
/// registration validation and distance bucketing; unknown ZIPs are
/// rejected rather than guessed.
static ZIP_TABLE: &[ZipRecord] = &[
    ZipRecord { zip: "10001", city: "New York", state: "NY", latitude: 40.7506, longitude: -73.9972 },
    ZipRecord { zip: "10002", city: "New York", state: "NY", latitude: 40.7157, longitude: -73.9860 },
    ZipRecord { zip: "10011", city: "New York", state: "NY", latitude: 40.7402, longitude: -74.0000 },
    ZipRecord { zip: "10016", city: "New York", state: "NY", latitude: 40.7459, longitude: -73.9777 },
    ZipRecord { zip: "10036", city: "New York", state: "NY", latitude: 40.7590, longitude: -73.9890 },
    ZipRecord { zip: "11201", city: "Brooklyn", state: "NY", latitude: 40.6937, longitude: -73.9897 },
    ZipRecord { zip: "07302", city: "Jersey City", state: "NJ", latitude: 40.7212, longitude: -74.0467 },
    ZipRecord { zip: "02108", city: "Boston", state: "MA", latitude: 42.3575, longitude: -71.0636 },
    ZipRecord { zip: "02139", city: "Cambridge", state: "MA", latitude: 42.3647, longitude: -71.1042 },
    ZipRecord { zip: "19103", city: "Philadelphia", state: "PA", latitude: 39.9524, longitude: -75.1737 },
    ZipRecord { zip: "20001", city: "Washington", state: "DC", latitude: 38.9109, longitude: -77.0163 },
    ZipRecord { zip: "21201", city: "Baltimore", state: "MD", latitude: 39.2946, longitude: -76.6252 },
    ZipRecord { zip: "28202", city: "Charlotte", state: "NC", latitude: 35.2286, longitude: -80.8429 },
    ZipRecord { zip: "30303", city: "Atlanta", state: "GA", latitude: 33.7525, longitude: -84.3888 },
    ZipRecord { zip: "33101", city: "Miami", state: "FL", latitude: 25.7743, longitude: -80.1937 },
    ZipRecord { zip: "33130", city: "Miami", state: "FL", latitude: 25.7677, longitude: -80.2044 },
    ZipRecord { zip: "37203", city: "Nashville", state: "TN", latitude: 36.1486, longitude: -86.7923 },
    ZipRecord { zip: "48226", city: "Detroit", state: "MI", latitude: 42.3316, longitude: -83.0497 },
    ZipRecord { zip: "53202", city: "Milwaukee", state: "WI", latitude: 43.0445, longitude: -87.9030 },
    ZipRecord { zip: "55401", city: "Minneapolis", state: "MN", latitude: 44.9841, longitude: -93.2700 },
    ZipRecord { zip: "60601", city: "Chicago", state: "IL", latitude: 41.8853, longitude: -87.6216 },
    ZipRecord { zip: "60614", city: "Chicago", state: "IL", latitude: 41.9230, longitude: -87.6487 },
    ZipRecord { zip: "64106", city: "Kansas City", state: "MO", latitude: 39.1058, longitude: -94.5734 },
    ZipRecord { zip: "75201", city: "Dallas", state: "TX", latitude: 32.7876, longitude: -96.7994 },
    ZipRecord { zip: "77002", city: "Houston", state: "TX", latitude: 29.7565, longitude: -95.3657 },
    ZipRecord { zip: "78205", city: "San Antonio", state: "TX", latitude: 29.4237, longitude: -98.4925 },
    ZipRecord { zip: "78701", city: "Austin", state: "TX", latitude: 30.2711, longitude: -97.7437 },
    ZipRecord { zip: "80202", city: "Denver", state: "CO", latitude: 39.7491, longitude: -104.9973 },
    ZipRecord { zip: "85004", city: "Phoenix", state: "AZ", latitude: 33.4512, longitude: -112.0707 },
    ZipRecord { zip: "89101", city: "Las Vegas", state: "NV", latitude: 36.1719, longitude: -115.1221 },
    ZipRecord { zip: "90012", city: "Los Angeles", state: "CA", latitude: 34.0614, longitude: -118.2385 },
    ZipRecord { zip: "90210", city: "Beverly Hills", state: "CA", latitude: 34.0901, longitude: -118.4065 },
    ZipRecord { zip: "92101", city: "San Diego", state: "CA", latitude: 32.7195, longitude: -117.1629 },
    ZipRecord { zip: "94102", city: "San Francisco", state: "CA", latitude: 37.7793, longitude: -122.4193 },
    ZipRecord { zip: "94103", city: "San Francisco", state: "CA", latitude: 37.7725, longitude: -122.4147 },
    ZipRecord { zip: "94107", city: "San Francisco", state: "CA", latitude: 37.7621, longitude: -122.3971 },
    ZipRecord { zip: "94110", city: "San Francisco", state: "CA", latitude: 37.7509, longitude: -122.4153 },
    ZipRecord { zip: "94117", city: "San Francisco", state: "CA", latitude: 37.7692, longitude: -122.4449 },
    ZipRecord { zip: "94133", city: "San Francisco", state: "CA", latitude: 37.8002, longitude: -122.4091 },
    ZipRecord { zip: "94607", city: "Oakland", state: "CA", latitude: 37.8049, longitude: -122.2968 },
    ZipRecord { zip: "94704", city: "Berkeley", state: "CA", latitude: 37.8668, longitude: -122.2578 },
    ZipRecord { zip: "95113", city: "San Jose", state: "CA", latitude: 37.3337, longitude: -121.8907 },
    ZipRecord { zip: "95814", city: "Sacramento", state: "CA", latitude: 38.5810, longitude: -121.4944 },
    ZipRecord { zip: "97201", city: "Portland", state: "OR", latitude: 45.5080, longitude: -122.6896 },
    ZipRecord { zip: "98101", city: "Seattle", state: "WA", latitude: 47.6101, longitude: -122.3344 },
    ZipRecord { zip: "98109", city: "Seattle", state: "WA", latitude: 47.6312, longitude: -122.3441 },
    ZipRecord { zip: "99501", city: "Anchorage", state: "AK", latitude: 61.2181, longitude: -149.8616 },
    ZipRecord { zip: "96813", city: "Honolulu", state: "HI", latitude: 21.3099, longitude: -157.8581 },
];

pub fn lookup_zip(zip: &str) -> Option<&'static ZipRecord> {
    ZIP_TABLE.iter().find(|record| record.zip == zip)
}

/// 5 consecutive ASCII digits, nothing else.
pub fn is_valid_zip_format(zip: &str) -> bool {
    zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_us_country(country: &str) -> bool {
    matches!(
        country.trim().to_lowercase().as_str(),
        "us" | "usa" | "u.s." | "u.s.a." | "united states" | "united states of america"
    )
}

/// Continental US plus Alaska and Hawaii bounding boxes.
pub fn within_us_bounds(latitude: f64, longitude: f64) -> bool {
    let continental = (24.396..=49.384).contains(&latitude)
        && (-124.848..=-66.885).contains(&longitude);
    let alaska =
        (51.2..=71.5).contains(&latitude) && (-179.2..=-129.9).contains(&longitude);
    let hawaii =
        (18.9..=22.3).contains(&latitude) && (-160.3..=-154.8).contains(&longitude);
    continental || alaska || hawaii
}

pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}

/// One-decimal rounding for distances on the wire.
pub fn round_miles(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_10001_is_new_york() {
        let record = lookup_zip("10001").expect("10001 in table");
        assert_eq!(record.city, "New York");
        assert_eq!(record.state, "NY");
    }

    #[test]
    fn unknown_zip_is_none() {
        assert!(lookup_zip("00000").is_none());
    }

    #[test]
    fn zip_format_rules() {
        assert!(is_valid_zip_format("94102"));
        assert!(!is_valid_zip_format("9410"));
        assert!(!is_valid_zip_format("94102-1234"));
        assert!(!is_valid_zip_format("ABCDE"));
    }

    #[test]
    fn country_normalization() {
        assert!(is_us_country("US"));
        assert!(is_us_country(" united states "));
        assert!(is_us_country("U.S.A."));
        assert!(!is_us_country("Canada"));
    }

    #[test]
    fn bounds_cover_all_three_regions() {
        assert!(within_us_bounds(37.7793, -122.4193)); // San Francisco
        assert!(within_us_bounds(61.2181, -149.8616)); // Anchorage
        assert!(within_us_bounds(21.3099, -157.8581)); // Honolulu
        assert!(!within_us_bounds(51.5074, -0.1278)); // London
        assert!(!within_us_bounds(19.4326, -99.1332)); // Mexico City
    }

    #[test]
    fn haversine_sf_to_oakland() {
        let sf = lookup_zip("94102").unwrap();
        let oakland = lookup_zip("94607").unwrap();
        let miles = haversine_miles(sf.latitude, sf.longitude, oakland.latitude, oakland.longitude);
        assert!(miles > 5.0 && miles < 12.0, "got {miles}");
    }

    #[test]
    fn haversine_sf_to_nyc() {
        let sf = lookup_zip("94102").unwrap();
        let nyc = lookup_zip("10001").unwrap();
        let miles = haversine_miles(sf.latitude, sf.longitude, nyc.latitude, nyc.longitude);
        assert!(miles > 2500.0 && miles < 2650.0, "got {miles}");
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round_miles(8.316), 8.3);
        assert_eq!(round_miles(8.35), 8.4);
    }
}
