use serde_derive::Deserialize;

/// One entry of the Connect activity list. Every field is optional upstream,
/// presence is checked when the record is derived.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GarminActivity {
    pub start_time_local: Option<String>,

    // meters
    pub distance: Option<f64>,

    // seconds
    pub duration: Option<f64>,

    pub elevation_gain: Option<f64>,
    pub max_elevation: Option<f64>,
    pub average_running_cadence_in_steps_per_minute: Option<f64>,

    // centimeters
    pub avg_stride_length: Option<f64>,

    #[serde(rename = "averageHR")]
    pub average_hr: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DateWeight {
    // grams
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BodyComposition {
    #[serde(default)]
    pub date_weight_list: Vec<DateWeight>,
}
