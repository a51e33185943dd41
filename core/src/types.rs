use serde::{Deserialize, Serialize};

use crate::frame::Frame;

// ============================================================================
// FEATURE RECORD
// ============================================================================

/// One row of classifier input: the fifteen named census features.
///
/// Column names and order must match what the loaded artifact expects;
/// `COLUMNS` is the single source of truth for both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub age: u32,
    pub education: Education,
    #[serde(rename = "educational-num")]
    pub educational_num: u32,
    pub occupation: Occupation,
    #[serde(rename = "hours-per-week")]
    pub hours_per_week: u32,
    pub experience: u32,
    #[serde(rename = "capital-gain")]
    pub capital_gain: u32,
    #[serde(rename = "capital-loss")]
    pub capital_loss: u32,
    pub fnlwgt: u32,
    pub race: Race,
    pub workclass: Workclass,
    #[serde(rename = "marital-status")]
    pub marital_status: MaritalStatus,
    pub relationship: Relationship,
    pub gender: Gender,
    #[serde(rename = "native-country")]
    pub native_country: NativeCountry,
}

impl FeatureRecord {
    pub const COLUMNS: [&'static str; 15] = [
        "age",
        "education",
        "educational-num",
        "occupation",
        "hours-per-week",
        "experience",
        "capital-gain",
        "capital-loss",
        "fnlwgt",
        "race",
        "workclass",
        "marital-status",
        "relationship",
        "gender",
        "native-country",
    ];

    /// Clamp the bounded integers into their control ranges. The hosting
    /// UI's sliders cannot produce out-of-range values; this is the same
    /// guarantee for values arriving over the wire.
    pub fn normalized(mut self) -> Self {
        self.age = clamp_range(self.age, 18, 65);
        self.educational_num = clamp_range(self.educational_num, 1, 16);
        self.hours_per_week = clamp_range(self.hours_per_week, 1, 80);
        self.experience = self.experience.min(40);
        self
    }

    /// The record's values as strings, in `COLUMNS` order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.age.to_string(),
            self.education.label().to_string(),
            self.educational_num.to_string(),
            self.occupation.label().to_string(),
            self.hours_per_week.to_string(),
            self.experience.to_string(),
            self.capital_gain.to_string(),
            self.capital_loss.to_string(),
            self.fnlwgt.to_string(),
            self.race.label().to_string(),
            self.workclass.label().to_string(),
            self.marital_status.label().to_string(),
            self.relationship.label().to_string(),
            self.gender.label().to_string(),
            self.native_country.label().to_string(),
        ]
    }

    /// Wrap the record as a single-row table for the predictor.
    pub fn to_frame(&self) -> Frame {
        let columns = Self::COLUMNS.iter().map(|name| name.to_string()).collect();
        Frame::from_parts(columns, vec![self.to_row()])
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        FeatureRecord {
            age: 30,
            education: Education::Bachelors,
            educational_num: 10,
            occupation: Occupation::TechSupport,
            hours_per_week: 40,
            experience: 5,
            capital_gain: 0,
            capital_loss: 0,
            fnlwgt: 100_000,
            race: Race::White,
            workclass: Workclass::Private,
            marital_status: MaritalStatus::NeverMarried,
            relationship: Relationship::Wife,
            gender: Gender::Male,
            native_country: NativeCountry::UnitedStates,
        }
    }
}

fn clamp_range(value: u32, min: u32, max: u32) -> u32 {
    value.clamp(min, max)
}

// ============================================================================
// CATEGORICAL DOMAINS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    Bachelors,
    Masters,
    PhD,
    #[serde(rename = "HS-grad")]
    HsGrad,
    Assoc,
    #[serde(rename = "Some-college")]
    SomeCollege,
}

impl Education {
    pub const LABELS: [&'static str; 6] = [
        "Bachelors",
        "Masters",
        "PhD",
        "HS-grad",
        "Assoc",
        "Some-college",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Education::Bachelors => "Bachelors",
            Education::Masters => "Masters",
            Education::PhD => "PhD",
            Education::HsGrad => "HS-grad",
            Education::Assoc => "Assoc",
            Education::SomeCollege => "Some-college",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupation {
    #[serde(rename = "Tech-support")]
    TechSupport,
    #[serde(rename = "Craft-repair")]
    CraftRepair,
    #[serde(rename = "Other-service")]
    OtherService,
    Sales,
    #[serde(rename = "Exec-managerial")]
    ExecManagerial,
    #[serde(rename = "Prof-specialty")]
    ProfSpecialty,
    #[serde(rename = "Handlers-cleaners")]
    HandlersCleaners,
    #[serde(rename = "Machine-op-inspct")]
    MachineOpInspct,
    #[serde(rename = "Adm-clerical")]
    AdmClerical,
    #[serde(rename = "Farming-fishing")]
    FarmingFishing,
    #[serde(rename = "Transport-moving")]
    TransportMoving,
    #[serde(rename = "Priv-house-serv")]
    PrivHouseServ,
    #[serde(rename = "Protective-serv")]
    ProtectiveServ,
    #[serde(rename = "Armed-Forces")]
    ArmedForces,
}

impl Occupation {
    pub const LABELS: [&'static str; 14] = [
        "Tech-support",
        "Craft-repair",
        "Other-service",
        "Sales",
        "Exec-managerial",
        "Prof-specialty",
        "Handlers-cleaners",
        "Machine-op-inspct",
        "Adm-clerical",
        "Farming-fishing",
        "Transport-moving",
        "Priv-house-serv",
        "Protective-serv",
        "Armed-Forces",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Occupation::TechSupport => "Tech-support",
            Occupation::CraftRepair => "Craft-repair",
            Occupation::OtherService => "Other-service",
            Occupation::Sales => "Sales",
            Occupation::ExecManagerial => "Exec-managerial",
            Occupation::ProfSpecialty => "Prof-specialty",
            Occupation::HandlersCleaners => "Handlers-cleaners",
            Occupation::MachineOpInspct => "Machine-op-inspct",
            Occupation::AdmClerical => "Adm-clerical",
            Occupation::FarmingFishing => "Farming-fishing",
            Occupation::TransportMoving => "Transport-moving",
            Occupation::PrivHouseServ => "Priv-house-serv",
            Occupation::ProtectiveServ => "Protective-serv",
            Occupation::ArmedForces => "Armed-Forces",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Race {
    White,
    Black,
    #[serde(rename = "Asian-Pac-Islander")]
    AsianPacIslander,
    #[serde(rename = "Amer-Indian-Eskimo")]
    AmerIndianEskimo,
    Other,
}

impl Race {
    pub const LABELS: [&'static str; 5] = [
        "White",
        "Black",
        "Asian-Pac-Islander",
        "Amer-Indian-Eskimo",
        "Other",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Race::White => "White",
            Race::Black => "Black",
            Race::AsianPacIslander => "Asian-Pac-Islander",
            Race::AmerIndianEskimo => "Amer-Indian-Eskimo",
            Race::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Workclass {
    Private,
    #[serde(rename = "Self-emp-not-inc")]
    SelfEmpNotInc,
    #[serde(rename = "Self-emp-inc")]
    SelfEmpInc,
    #[serde(rename = "Federal-gov")]
    FederalGov,
    #[serde(rename = "Local-gov")]
    LocalGov,
    #[serde(rename = "State-gov")]
    StateGov,
    #[serde(rename = "Without-pay")]
    WithoutPay,
}

impl Workclass {
    pub const LABELS: [&'static str; 7] = [
        "Private",
        "Self-emp-not-inc",
        "Self-emp-inc",
        "Federal-gov",
        "Local-gov",
        "State-gov",
        "Without-pay",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Workclass::Private => "Private",
            Workclass::SelfEmpNotInc => "Self-emp-not-inc",
            Workclass::SelfEmpInc => "Self-emp-inc",
            Workclass::FederalGov => "Federal-gov",
            Workclass::LocalGov => "Local-gov",
            Workclass::StateGov => "State-gov",
            Workclass::WithoutPay => "Without-pay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaritalStatus {
    #[serde(rename = "Never-married")]
    NeverMarried,
    #[serde(rename = "Married-civ-spouse")]
    MarriedCivSpouse,
    Divorced,
    Separated,
    Widowed,
    #[serde(rename = "Married-spouse-absent")]
    MarriedSpouseAbsent,
}

impl MaritalStatus {
    pub const LABELS: [&'static str; 6] = [
        "Never-married",
        "Married-civ-spouse",
        "Divorced",
        "Separated",
        "Widowed",
        "Married-spouse-absent",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MaritalStatus::NeverMarried => "Never-married",
            MaritalStatus::MarriedCivSpouse => "Married-civ-spouse",
            MaritalStatus::Divorced => "Divorced",
            MaritalStatus::Separated => "Separated",
            MaritalStatus::Widowed => "Widowed",
            MaritalStatus::MarriedSpouseAbsent => "Married-spouse-absent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    Wife,
    #[serde(rename = "Own-child")]
    OwnChild,
    Husband,
    #[serde(rename = "Not-in-family")]
    NotInFamily,
    #[serde(rename = "Other-relative")]
    OtherRelative,
    Unmarried,
}

impl Relationship {
    pub const LABELS: [&'static str; 6] = [
        "Wife",
        "Own-child",
        "Husband",
        "Not-in-family",
        "Other-relative",
        "Unmarried",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Relationship::Wife => "Wife",
            Relationship::OwnChild => "Own-child",
            Relationship::Husband => "Husband",
            Relationship::NotInFamily => "Not-in-family",
            Relationship::OtherRelative => "Other-relative",
            Relationship::Unmarried => "Unmarried",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const LABELS: [&'static str; 2] = ["Male", "Female"];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeCountry {
    #[serde(rename = "United-States")]
    UnitedStates,
    India,
    Mexico,
    Philippines,
    Germany,
    Canada,
    England,
    Italy,
    Other,
}

impl NativeCountry {
    pub const LABELS: [&'static str; 9] = [
        "United-States",
        "India",
        "Mexico",
        "Philippines",
        "Germany",
        "Canada",
        "England",
        "Italy",
        "Other",
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NativeCountry::UnitedStates => "United-States",
            NativeCountry::India => "India",
            NativeCountry::Mexico => "Mexico",
            NativeCountry::Philippines => "Philippines",
            NativeCountry::Germany => "Germany",
            NativeCountry::Canada => "Canada",
            NativeCountry::England => "England",
            NativeCountry::Italy => "Italy",
            NativeCountry::Other => "Other",
        }
    }
}

// ============================================================================
// FORM SCHEMA
// ============================================================================

/// Description of one input control for the hosting UI.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub control: FieldControl,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldControl {
    /// Bounded integer, rendered as a slider.
    Slider { min: u32, max: u32, default: u32 },
    /// Non-negative integer with no upper bound, rendered as a numeric input.
    Number { min: u32, default: u32 },
    /// Fixed-choice categorical, rendered as a select box.
    Select {
        options: Vec<&'static str>,
        default: &'static str,
    },
}

/// Per-field control domains, in `FeatureRecord::COLUMNS` order.
pub fn form_schema() -> Vec<FieldSchema> {
    vec![
        FieldSchema {
            name: "age",
            control: FieldControl::Slider {
                min: 18,
                max: 65,
                default: 30,
            },
        },
        FieldSchema {
            name: "education",
            control: FieldControl::Select {
                options: Education::LABELS.to_vec(),
                default: "Bachelors",
            },
        },
        FieldSchema {
            name: "educational-num",
            control: FieldControl::Slider {
                min: 1,
                max: 16,
                default: 10,
            },
        },
        FieldSchema {
            name: "occupation",
            control: FieldControl::Select {
                options: Occupation::LABELS.to_vec(),
                default: "Tech-support",
            },
        },
        FieldSchema {
            name: "hours-per-week",
            control: FieldControl::Slider {
                min: 1,
                max: 80,
                default: 40,
            },
        },
        FieldSchema {
            name: "experience",
            control: FieldControl::Slider {
                min: 0,
                max: 40,
                default: 5,
            },
        },
        FieldSchema {
            name: "capital-gain",
            control: FieldControl::Number { min: 0, default: 0 },
        },
        FieldSchema {
            name: "capital-loss",
            control: FieldControl::Number { min: 0, default: 0 },
        },
        FieldSchema {
            name: "fnlwgt",
            control: FieldControl::Number {
                min: 0,
                default: 100_000,
            },
        },
        FieldSchema {
            name: "race",
            control: FieldControl::Select {
                options: Race::LABELS.to_vec(),
                default: "White",
            },
        },
        FieldSchema {
            name: "workclass",
            control: FieldControl::Select {
                options: Workclass::LABELS.to_vec(),
                default: "Private",
            },
        },
        FieldSchema {
            name: "marital-status",
            control: FieldControl::Select {
                options: MaritalStatus::LABELS.to_vec(),
                default: "Never-married",
            },
        },
        FieldSchema {
            name: "relationship",
            control: FieldControl::Select {
                options: Relationship::LABELS.to_vec(),
                default: "Wife",
            },
        },
        FieldSchema {
            name: "gender",
            control: FieldControl::Select {
                options: Gender::LABELS.to_vec(),
                default: "Male",
            },
        },
        FieldSchema {
            name: "native-country",
            control: FieldControl::Select {
                options: NativeCountry::LABELS.to_vec(),
                default: "United-States",
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_row_matches_column_order() {
        let record = FeatureRecord::default();
        let row = record.to_row();
        assert_eq!(row.len(), FeatureRecord::COLUMNS.len());
        assert_eq!(row[0], "30");
        assert_eq!(row[1], "Bachelors");
        assert_eq!(row[4], "40");
        assert_eq!(row[8], "100000");
        assert_eq!(row[13], "Male");
        assert_eq!(row[14], "United-States");
    }

    #[test]
    fn frame_carries_all_fifteen_columns() {
        let frame = FeatureRecord::default().to_frame();
        assert_eq!(frame.columns(), &FeatureRecord::COLUMNS);
        assert_eq!(frame.row_count(), 1);
    }

    #[test]
    fn schema_matches_column_order() {
        let schema = form_schema();
        let names: Vec<&str> = schema.iter().map(|field| field.name).collect();
        assert_eq!(names, FeatureRecord::COLUMNS.to_vec());
    }

    #[test]
    fn normalized_clamps_bounded_fields() {
        let record = FeatureRecord {
            age: 150,
            educational_num: 0,
            hours_per_week: 200,
            experience: 99,
            ..FeatureRecord::default()
        }
        .normalized();

        assert_eq!(record.age, 65);
        assert_eq!(record.educational_num, 1);
        assert_eq!(record.hours_per_week, 80);
        assert_eq!(record.experience, 40);
    }

    #[test]
    fn categorical_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&MaritalStatus::MarriedCivSpouse).unwrap();
        assert_eq!(json, "\"Married-civ-spouse\"");
        let parsed: MaritalStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, MaritalStatus::MarriedCivSpouse);

        let hyphenated: Occupation = serde_json::from_str("\"Machine-op-inspct\"").unwrap();
        assert_eq!(hyphenated.label(), "Machine-op-inspct");
    }

    #[test]
    fn record_deserializes_from_hyphenated_fields() {
        let json = r#"{
            "age": 42,
            "education": "Masters",
            "educational-num": 14,
            "occupation": "Exec-managerial",
            "hours-per-week": 50,
            "experience": 12,
            "capital-gain": 0,
            "capital-loss": 0,
            "fnlwgt": 200000,
            "race": "White",
            "workclass": "Private",
            "marital-status": "Divorced",
            "relationship": "Not-in-family",
            "gender": "Female",
            "native-country": "Germany"
        }"#;

        let record: FeatureRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.age, 42);
        assert_eq!(record.occupation, Occupation::ExecManagerial);
        assert_eq!(record.native_country, NativeCountry::Germany);
    }
}
