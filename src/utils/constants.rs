/// Field survey column labels, in the order of the corrected table
pub const FIELD_ID: &str = "Field_ID";
pub const ELEVATION: &str = "Elevation";
pub const LATITUDE: &str = "Latitude";
pub const LONGITUDE: &str = "Longitude";
pub const LOCATION: &str = "Location";
pub const SLOPE: &str = "Slope";
pub const RAINFALL: &str = "Rainfall";
pub const MIN_TEMPERATURE: &str = "Min_temperature_C";
pub const MAX_TEMPERATURE: &str = "Max_temperature_C";
pub const AVE_TEMPS: &str = "Ave_temps";
pub const SOIL_FERTILITY: &str = "Soil_fertility";
pub const SOIL_TYPE: &str = "Soil_type";
pub const PH: &str = "pH";
pub const POLLUTION_LEVEL: &str = "Pollution_level";
pub const PLOT_SIZE: &str = "Plot_size";
pub const CROP_TYPE: &str = "Crop_type";
pub const ANNUAL_YIELD: &str = "Annual_yield";
pub const STANDARD_YIELD: &str = "Standard_yield";

pub const FIELD_COLUMNS: [&str; 18] = [
    FIELD_ID,
    ELEVATION,
    LATITUDE,
    LONGITUDE,
    LOCATION,
    SLOPE,
    RAINFALL,
    MIN_TEMPERATURE,
    MAX_TEMPERATURE,
    AVE_TEMPS,
    SOIL_FERTILITY,
    SOIL_TYPE,
    PH,
    POLLUTION_LEVEL,
    PLOT_SIZE,
    CROP_TYPE,
    ANNUAL_YIELD,
    STANDARD_YIELD,
];

/// Weather station message columns
pub const WEATHER_STATION_ID: &str = "Weather_station_ID";
pub const MESSAGE: &str = "Message";

pub const WEATHER_COLUMNS: [&str; 2] = [WEATHER_STATION_ID, MESSAGE];

/// Field to station mapping columns (the mapping file may carry extra index columns)
pub const STATION_MAPPING_COLUMNS: [&str; 2] = [FIELD_ID, WEATHER_STATION_ID];

/// Default data sources
pub const DEFAULT_DB_PATH: &str = "sqlite:///Maji_Ndogo_farm_survey_small.db";
pub const DEFAULT_WEATHER_MAP_URL: &str =
    "https://raw.githubusercontent.com/Explore-AI/Public-Data/master/Maji_Ndogo/Weather_data_field_mapping.csv";
pub const DEFAULT_WEATHER_CSV_URL: &str =
    "https://raw.githubusercontent.com/Explore-AI/Public-Data/master/Maji_Ndogo/Weather_station_data.csv";

pub const DEFAULT_SQL_QUERY: &str = "SELECT *
FROM geographic_features
LEFT JOIN weather_features USING (Field_ID)
LEFT JOIN soil_and_crop_features USING (Field_ID)
LEFT JOIN farm_management_features USING (Field_ID)";

/// Default extraction patterns
pub const RAINFALL_PATTERN: &str = r"(\d+(\.\d+)?)\s?mm";
pub const TEMPERATURE_PATTERN: &str = r"(\d+(\.\d+)?)\s?C";
pub const POLLUTION_PATTERN: &str = r"=\s*(-?\d+(\.\d+)?)|Pollution at \s*(-?\d+(\.\d+)?)";

/// Known crop label misspellings in the survey data
pub const DEFAULT_VALUE_RENAMES: [(&str, &str); 3] =
    [("cassaval", "cassava"), ("wheatn", "wheat"), ("teaa", "tea")];

/// Valid physical ranges
pub const MIN_VALID_PH: f64 = 0.0;
pub const MAX_VALID_PH: f64 = 14.0;

/// HTTP fetch timeout in seconds
pub const FETCH_TIMEOUT_SECS: u64 = 60;

/// Config environment prefix (AGRI__DB_PATH=...)
pub const ENV_PREFIX: &str = "AGRI";
