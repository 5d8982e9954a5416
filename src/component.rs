use crate::id_generator;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Partial update for a component's `data`: field name -> new value
pub type DataPatch = Map<String, Value>;

/// Partial update for a component's `style`: property name -> new value
pub type StylePatch = BTreeMap<String, String>;

/// Build a data patch from a JSON object literal (non-objects yield an empty patch)
pub fn data_patch(value: Value) -> DataPatch {
    match value {
        Value::Object(map) => map,
        _ => DataPatch::new(),
    }
}

/// Errors raised when component data does not fit its type
#[derive(Debug, Error)]
pub enum ComponentDataError {
    #[error("unknown component type: {0}")]
    UnknownType(String),

    #[error("data does not fit a {kind} component: {source}")]
    Shape {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("data of a {0} component must be a JSON object")]
    NotAnObject(String),

    #[error("option list must contain at least one option")]
    EmptyOptions,

    #[error("maxSelections must be at least 1")]
    InvalidMaxSelections,

    #[error("duplicate option id: {0}")]
    DuplicateOptionId(String),
}

/// The fixed catalog of content blocks offered by the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    Heading,
    Text,
    Image,
    Input,
    Button,
    OptionList,
    Spacer,
    Video,
    Testimonial,
    Price,
    Countdown,
    Guarantee,
    BonusList,
    FaqList,
    SocialProof,
    Logo,
    ProgressBar,
}

impl ComponentType {
    /// Every catalog entry, in palette order
    pub const ALL: [ComponentType; 17] = [
        ComponentType::Heading,
        ComponentType::Text,
        ComponentType::Image,
        ComponentType::Input,
        ComponentType::Button,
        ComponentType::OptionList,
        ComponentType::Spacer,
        ComponentType::Video,
        ComponentType::Testimonial,
        ComponentType::Price,
        ComponentType::Countdown,
        ComponentType::Guarantee,
        ComponentType::BonusList,
        ComponentType::FaqList,
        ComponentType::SocialProof,
        ComponentType::Logo,
        ComponentType::ProgressBar,
    ];

    /// Palette name, also used as the persisted `type` and the id prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Image => "image",
            Self::Input => "input",
            Self::Button => "button",
            Self::OptionList => "option-list",
            Self::Spacer => "spacer",
            Self::Video => "video",
            Self::Testimonial => "testimonial",
            Self::Price => "price",
            Self::Countdown => "countdown",
            Self::Guarantee => "guarantee",
            Self::BonusList => "bonus-list",
            Self::FaqList => "faq-list",
            Self::SocialProof => "social-proof",
            Self::Logo => "logo",
            Self::ProgressBar => "progress-bar",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = ComponentDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| ComponentDataError::UnknownType(s.to_string()))
    }
}

// ========== Per-type data ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingData {
    pub text: String,
    /// Heading level, 1..=6
    pub level: u8,
}

impl Default for HeadingData {
    fn default() -> Self {
        Self {
            text: "Your headline here".to_string(),
            level: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextData {
    pub content: String,
}

impl Default for TextData {
    fn default() -> Self {
        Self {
            content: "Tell your visitors what this step is about.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageData {
    pub src: String,
    pub alt: String,
    pub caption: String,
}

impl Default for ImageData {
    fn default() -> Self {
        Self {
            src: "https://placehold.co/600x400".to_string(),
            alt: "Image".to_string(),
            caption: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Phone,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputData {
    pub label: String,
    pub placeholder: String,
    /// Field name submitted with the lead
    pub name: String,
    pub input_type: InputKind,
    pub required: bool,
}

impl Default for InputData {
    fn default() -> Self {
        Self {
            label: "Your email".to_string(),
            placeholder: "name@example.com".to_string(),
            name: "email".to_string(),
            input_type: InputKind::Email,
            required: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonAction {
    #[default]
    NextPage,
    Url,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonData {
    pub text: String,
    pub action: ButtonAction,
    /// Target for `ButtonAction::Url`
    pub url: String,
    pub full_width: bool,
}

impl Default for ButtonData {
    fn default() -> Self {
        Self {
            text: "Continue".to_string(),
            action: ButtonAction::NextPage,
            url: String::new(),
            full_width: true,
        }
    }
}

/// One selectable answer of an option list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub value: String,
    /// Result category this answer scores towards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl QuizOption {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id_generator::generate_id("option"),
            text: text.into(),
            value: value.into(),
            category: None,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionLayout {
    #[default]
    List,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionListData {
    pub question: String,
    pub options: Vec<QuizOption>,
    pub multi_select: bool,
    /// Upper bound on picks, only meaningful with `multi_select`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
    pub layout: OptionLayout,
    /// Advance to the next page as soon as a single-select answer is picked
    pub auto_advance: bool,
}

impl Default for OptionListData {
    fn default() -> Self {
        Self {
            question: "Choose an option".to_string(),
            options: (1..=3)
                .map(|n| QuizOption::new(format!("Option {}", n), format!("option-{}", n)))
                .collect(),
            multi_select: false,
            max_selections: None,
            layout: OptionLayout::List,
            auto_advance: true,
        }
    }
}

impl OptionListData {
    /// Check the option-list constraints
    pub fn check(&self) -> Result<(), ComponentDataError> {
        if self.options.is_empty() {
            return Err(ComponentDataError::EmptyOptions);
        }
        if self.max_selections == Some(0) {
            return Err(ComponentDataError::InvalidMaxSelections);
        }
        let mut seen = std::collections::HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id.as_str()) {
                return Err(ComponentDataError::DuplicateOptionId(option.id.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerData {
    /// Height in pixels
    pub height: u32,
}

impl Default for SpacerData {
    fn default() -> Self {
        Self { height: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoData {
    pub url: String,
    pub autoplay: bool,
    pub muted: bool,
    pub controls: bool,
}

impl Default for VideoData {
    fn default() -> Self {
        Self {
            url: String::new(),
            autoplay: false,
            muted: true,
            controls: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialData {
    pub quote: String,
    pub author: String,
    pub role: String,
    pub avatar: String,
    /// Star rating, 0..=5
    pub rating: u8,
}

impl Default for TestimonialData {
    fn default() -> Self {
        Self {
            quote: "This changed the way I work. Highly recommended!".to_string(),
            author: "Jane Doe".to_string(),
            role: "Customer".to_string(),
            avatar: String::new(),
            rating: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceData {
    pub title: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub currency: String,
    /// Billing period label, empty for one-off payments
    pub period: String,
    pub features: Vec<String>,
    pub highlight: bool,
}

impl Default for PriceData {
    fn default() -> Self {
        Self {
            title: "Full access".to_string(),
            price: 47.0,
            original_price: Some(97.0),
            currency: "USD".to_string(),
            period: String::new(),
            features: vec![
                "Lifetime access".to_string(),
                "All future updates".to_string(),
            ],
            highlight: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountdownData {
    pub duration_seconds: u32,
    pub label: String,
    pub expired_text: String,
}

impl Default for CountdownData {
    fn default() -> Self {
        Self {
            duration_seconds: 600,
            label: "Offer ends in".to_string(),
            expired_text: "Offer expired".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuaranteeData {
    pub title: String,
    pub description: String,
    pub days: u32,
}

impl Default for GuaranteeData {
    fn default() -> Self {
        Self {
            title: "30-day money-back guarantee".to_string(),
            description: "If you are not satisfied, we refund every cent.".to_string(),
            days: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BonusItem {
    pub title: String,
    pub description: String,
    /// Display value, e.g. "$49"
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BonusListData {
    pub title: String,
    pub items: Vec<BonusItem>,
}

impl Default for BonusListData {
    fn default() -> Self {
        Self {
            title: "Exclusive bonuses".to_string(),
            items: vec![BonusItem {
                title: "Bonus #1".to_string(),
                description: "A quick-start checklist".to_string(),
                value: "$29".to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaqListData {
    pub title: String,
    pub items: Vec<FaqItem>,
}

impl Default for FaqListData {
    fn default() -> Self {
        Self {
            title: "Frequently asked questions".to_string(),
            items: vec![
                FaqItem {
                    question: "How do I get access?".to_string(),
                    answer: "You receive an email right after purchase.".to_string(),
                },
                FaqItem {
                    question: "Can I get a refund?".to_string(),
                    answer: "Yes, within the guarantee period.".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialProofData {
    pub text: String,
    pub count: u32,
    pub avatars: Vec<String>,
}

impl Default for SocialProofData {
    fn default() -> Self {
        Self {
            text: "people have already taken this quiz".to_string(),
            count: 12_000,
            avatars: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoData {
    pub src: String,
    pub alt: String,
    /// Width in pixels
    pub width: u32,
}

impl Default for LogoData {
    fn default() -> Self {
        Self {
            src: String::new(),
            alt: "Logo".to_string(),
            width: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressBarData {
    pub show_percentage: bool,
    pub color: String,
}

impl Default for ProgressBarData {
    fn default() -> Self {
        Self {
            show_percentage: true,
            color: "#2563eb".to_string(),
        }
    }
}

/// Component data, one variant per catalog entry
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    Heading(HeadingData),
    Text(TextData),
    Image(ImageData),
    Input(InputData),
    Button(ButtonData),
    OptionList(OptionListData),
    Spacer(SpacerData),
    Video(VideoData),
    Testimonial(TestimonialData),
    Price(PriceData),
    Countdown(CountdownData),
    Guarantee(GuaranteeData),
    BonusList(BonusListData),
    FaqList(FaqListData),
    SocialProof(SocialProofData),
    Logo(LogoData),
    ProgressBar(ProgressBarData),

    /// A palette type outside the catalog; carries whatever fields it was given
    Custom {
        kind: String,
        fields: Map<String, Value>,
    },
}

impl ComponentData {
    /// Default data for a catalog type
    pub fn default_for(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Heading => Self::Heading(HeadingData::default()),
            ComponentType::Text => Self::Text(TextData::default()),
            ComponentType::Image => Self::Image(ImageData::default()),
            ComponentType::Input => Self::Input(InputData::default()),
            ComponentType::Button => Self::Button(ButtonData::default()),
            ComponentType::OptionList => Self::OptionList(OptionListData::default()),
            ComponentType::Spacer => Self::Spacer(SpacerData::default()),
            ComponentType::Video => Self::Video(VideoData::default()),
            ComponentType::Testimonial => Self::Testimonial(TestimonialData::default()),
            ComponentType::Price => Self::Price(PriceData::default()),
            ComponentType::Countdown => Self::Countdown(CountdownData::default()),
            ComponentType::Guarantee => Self::Guarantee(GuaranteeData::default()),
            ComponentType::BonusList => Self::BonusList(BonusListData::default()),
            ComponentType::FaqList => Self::FaqList(FaqListData::default()),
            ComponentType::SocialProof => Self::SocialProof(SocialProofData::default()),
            ComponentType::Logo => Self::Logo(LogoData::default()),
            ComponentType::ProgressBar => Self::ProgressBar(ProgressBarData::default()),
        }
    }

    /// Catalog type of this data, `None` for custom components
    pub fn component_type(&self) -> Option<ComponentType> {
        let ty = match self {
            Self::Heading(_) => ComponentType::Heading,
            Self::Text(_) => ComponentType::Text,
            Self::Image(_) => ComponentType::Image,
            Self::Input(_) => ComponentType::Input,
            Self::Button(_) => ComponentType::Button,
            Self::OptionList(_) => ComponentType::OptionList,
            Self::Spacer(_) => ComponentType::Spacer,
            Self::Video(_) => ComponentType::Video,
            Self::Testimonial(_) => ComponentType::Testimonial,
            Self::Price(_) => ComponentType::Price,
            Self::Countdown(_) => ComponentType::Countdown,
            Self::Guarantee(_) => ComponentType::Guarantee,
            Self::BonusList(_) => ComponentType::BonusList,
            Self::FaqList(_) => ComponentType::FaqList,
            Self::SocialProof(_) => ComponentType::SocialProof,
            Self::Logo(_) => ComponentType::Logo,
            Self::ProgressBar(_) => ComponentType::ProgressBar,
            Self::Custom { .. } => return None,
        };
        Some(ty)
    }

    /// Name persisted under `type`
    pub fn type_name(&self) -> &str {
        match self {
            Self::Custom { kind, .. } => kind,
            other => other
                .component_type()
                .map(|ty| ty.as_str())
                .unwrap_or_default(),
        }
    }

    /// Read data of the given type from its JSON form, filling absent fields with defaults
    pub fn from_value(kind: &str, value: Value) -> Result<Self, ComponentDataError> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(map) => Value::Object(map),
            _ => return Err(ComponentDataError::NotAnObject(kind.to_string())),
        };

        let Ok(component_type) = kind.parse::<ComponentType>() else {
            let fields = match value {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            return Ok(Self::Custom {
                kind: kind.to_string(),
                fields,
            });
        };

        let shape = |source| ComponentDataError::Shape {
            kind: kind.to_string(),
            source,
        };

        let data = match component_type {
            ComponentType::Heading => Self::Heading(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Text => Self::Text(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Image => Self::Image(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Input => Self::Input(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Button => Self::Button(serde_json::from_value(value).map_err(shape)?),
            ComponentType::OptionList => {
                Self::OptionList(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::Spacer => Self::Spacer(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Video => Self::Video(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Testimonial => {
                Self::Testimonial(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::Price => Self::Price(serde_json::from_value(value).map_err(shape)?),
            ComponentType::Countdown => {
                Self::Countdown(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::Guarantee => {
                Self::Guarantee(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::BonusList => {
                Self::BonusList(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::FaqList => Self::FaqList(serde_json::from_value(value).map_err(shape)?),
            ComponentType::SocialProof => {
                Self::SocialProof(serde_json::from_value(value).map_err(shape)?)
            }
            ComponentType::Logo => Self::Logo(serde_json::from_value(value).map_err(shape)?),
            ComponentType::ProgressBar => {
                Self::ProgressBar(serde_json::from_value(value).map_err(shape)?)
            }
        };

        Ok(data)
    }

    /// Check type-specific constraints beyond shape
    pub fn check(&self) -> Result<(), ComponentDataError> {
        match self {
            Self::OptionList(data) => data.check(),
            _ => Ok(()),
        }
    }

    /// Shallow-merge a patch into this data, keeping the variant
    ///
    /// The `type` key is ignored. A patch that does not fit the variant's
    /// shape, or breaks its constraints, is rejected.
    pub fn merged(&self, patch: &DataPatch) -> Result<Self, ComponentDataError> {
        let kind = self.type_name().to_string();
        let mut value = serde_json::to_value(self).map_err(|source| ComponentDataError::Shape {
            kind: kind.clone(),
            source,
        })?;

        let Some(fields) = value.as_object_mut() else {
            return Err(ComponentDataError::NotAnObject(kind));
        };
        for (key, new_value) in patch {
            if key == "type" {
                continue;
            }
            fields.insert(key.clone(), new_value.clone());
        }

        let merged = Self::from_value(&kind, value)?;
        merged.check()?;
        Ok(merged)
    }
}

impl Serialize for ComponentData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Heading(data) => data.serialize(serializer),
            Self::Text(data) => data.serialize(serializer),
            Self::Image(data) => data.serialize(serializer),
            Self::Input(data) => data.serialize(serializer),
            Self::Button(data) => data.serialize(serializer),
            Self::OptionList(data) => data.serialize(serializer),
            Self::Spacer(data) => data.serialize(serializer),
            Self::Video(data) => data.serialize(serializer),
            Self::Testimonial(data) => data.serialize(serializer),
            Self::Price(data) => data.serialize(serializer),
            Self::Countdown(data) => data.serialize(serializer),
            Self::Guarantee(data) => data.serialize(serializer),
            Self::BonusList(data) => data.serialize(serializer),
            Self::FaqList(data) => data.serialize(serializer),
            Self::SocialProof(data) => data.serialize(serializer),
            Self::Logo(data) => data.serialize(serializer),
            Self::ProgressBar(data) => data.serialize(serializer),
            Self::Custom { fields, .. } => fields.serialize(serializer),
        }
    }
}

// ========== Style ==========

/// CSS-like style properties of a component, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a style from `(property, value)` pairs
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    /// Default style for a catalog type
    pub fn default_for(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Heading => Self::from_pairs(&[
                ("color", "#111827"),
                ("fontSize", "28px"),
                ("fontWeight", "700"),
                ("textAlign", "center"),
            ]),
            ComponentType::Text => Self::from_pairs(&[
                ("color", "#374151"),
                ("fontSize", "16px"),
                ("textAlign", "center"),
            ]),
            ComponentType::Image | ComponentType::Video => {
                Self::from_pairs(&[("borderRadius", "8px"), ("width", "100%")])
            }
            ComponentType::Input => Self::from_pairs(&[
                ("borderColor", "#d1d5db"),
                ("borderRadius", "8px"),
                ("padding", "12px"),
            ]),
            ComponentType::Button => Self::from_pairs(&[
                ("backgroundColor", "#2563eb"),
                ("borderRadius", "8px"),
                ("color", "#ffffff"),
                ("fontWeight", "600"),
                ("padding", "14px 24px"),
            ]),
            ComponentType::OptionList => Self::from_pairs(&[
                ("borderColor", "#e5e7eb"),
                ("gap", "12px"),
                ("selectedColor", "#2563eb"),
            ]),
            ComponentType::Testimonial | ComponentType::Guarantee | ComponentType::BonusList => {
                Self::from_pairs(&[
                    ("backgroundColor", "#f9fafb"),
                    ("borderRadius", "12px"),
                    ("padding", "16px"),
                ])
            }
            ComponentType::Price => Self::from_pairs(&[
                ("backgroundColor", "#ffffff"),
                ("borderColor", "#2563eb"),
                ("borderRadius", "12px"),
                ("padding", "24px"),
            ]),
            ComponentType::Countdown => {
                Self::from_pairs(&[("color", "#dc2626"), ("fontSize", "24px")])
            }
            ComponentType::FaqList | ComponentType::SocialProof => {
                Self::from_pairs(&[("textAlign", "left")])
            }
            ComponentType::Logo => Self::from_pairs(&[("margin", "0 auto")]),
            ComponentType::ProgressBar => Self::from_pairs(&[("height", "8px")]),
            ComponentType::Spacer => Self::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shallow-merge a patch; an empty value removes the property
    pub fn merged(&self, patch: &StylePatch) -> Self {
        let mut next = self.0.clone();
        for (property, value) in patch {
            if value.is_empty() {
                next.remove(property);
            } else {
                next.insert(property.clone(), value.clone());
            }
        }
        Self(next)
    }
}

// ========== Component ==========

/// One typed content block on a page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawComponent")]
pub struct Component {
    /// Globally unique within a funnel; the only way operations address a component
    pub id: String,

    /// Typed data; its variant fixes the component type for life
    pub data: ComponentData,

    pub style: Style,
}

impl Component {
    /// Create a component with default data and style for a catalog type
    pub fn new(component_type: ComponentType) -> Self {
        Self {
            id: id_generator::generate_id(component_type.as_str()),
            data: ComponentData::default_for(component_type),
            style: Style::default_for(component_type),
        }
    }

    /// Create a component with a specific ID (useful for testing)
    pub fn with_id(id: impl Into<String>, data: ComponentData, style: Style) -> Self {
        Self {
            id: id.into(),
            data,
            style,
        }
    }

    pub fn component_type(&self) -> Option<ComponentType> {
        self.data.component_type()
    }

    pub fn type_name(&self) -> &str {
        self.data.type_name()
    }

    /// Deep copy under a new id
    pub fn duplicate_as(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: self.data.clone(),
            style: self.style.clone(),
        }
    }
}

/// Create a fresh component for a palette type
///
/// Unknown types yield a custom component with empty data and style.
pub fn create_default_component(type_name: &str) -> Component {
    match type_name.parse::<ComponentType>() {
        Ok(component_type) => Component::new(component_type),
        Err(_) => Component {
            id: id_generator::generate_id(type_name),
            data: ComponentData::Custom {
                kind: type_name.to_string(),
                fields: Map::new(),
            },
            style: Style::new(),
        },
    }
}

impl Serialize for Component {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Component", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", self.type_name())?;
        state.serialize_field("data", &self.data)?;
        state.serialize_field("style", &self.style)?;
        state.end()
    }
}

/// Persisted shape `{ id, type, data, style }`
#[derive(Deserialize)]
struct RawComponent {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    style: Style,
}

impl TryFrom<RawComponent> for Component {
    type Error = ComponentDataError;

    fn try_from(raw: RawComponent) -> Result<Self, Self::Error> {
        let data = ComponentData::from_value(&raw.kind, raw.data)?;
        data.check()?;
        Ok(Self {
            id: raw.id,
            data,
            style: raw.style,
        })
    }
}
