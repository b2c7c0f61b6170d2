//! Rule definitions as served by the rule catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::variant::{text_enum, ParseVariantError};
use super::{RuleId, Severity};

/// Lifecycle status of a rule in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Ready,
    Beta,
    Deprecated,
    Removed,
}

text_enum!(RuleStatus, "rule status", {
    Ready => "READY",
    Beta => "BETA",
    Deprecated => "DEPRECATED",
    Removed => "REMOVED",
});

/// Value domain of a rule parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamKind {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    SingleSelectList,
}

text_enum!(ParamKind, "parameter type", {
    String => "STRING",
    Text => "TEXT",
    Integer => "INTEGER",
    Float => "FLOAT",
    Boolean => "BOOLEAN",
    SingleSelectList => "SINGLE_SELECT_LIST",
});

/// Full parameter type: kind, allowed values for select lists, and whether
/// a value is a comma-separated list.
///
/// Textual form: `INTEGER`, or
/// `SINGLE_SELECT_LIST,values="a,b,c",multiple=true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParamType {
    pub kind: ParamKind,
    pub values: Vec<String>,
    pub multiple: bool,
}

impl ParamType {
    pub fn of(kind: ParamKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
            multiple: false,
        }
    }

    pub fn single_select(values: &[&str], multiple: bool) -> Self {
        Self {
            kind: ParamKind::SingleSelectList,
            values: values.iter().map(|v| v.to_string()).collect(),
            multiple,
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        Self::of(ParamKind::String)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        if !self.values.is_empty() {
            write!(f, ",values=\"{}\"", self.values.join(","))?;
        }
        if self.multiple {
            f.write_str(",multiple=true")?;
        }
        Ok(())
    }
}

impl FromStr for ParamType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, attributes) = s.split_once(',').unwrap_or((s, ""));
        let mut param_type = ParamType::of(kind.trim().parse()?);
        for (key, value) in split_attributes(attributes) {
            match key.as_str() {
                "values" => {
                    param_type.values = value
                        .split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "multiple" => param_type.multiple = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }
        Ok(param_type)
    }
}

impl TryFrom<String> for ParamType {
    type Error = ParseVariantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ParamType> for String {
    fn from(value: ParamType) -> Self {
        value.to_string()
    }
}

/// Splits `key=value,key="quoted,value"` into pairs. Quoted values may
/// contain commas.
fn split_attributes(input: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut chars = input.chars().peekable();
    loop {
        let key: String = chars.by_ref().take_while(|c| *c != '=').collect();
        let key = key.trim().trim_start_matches(',').trim().to_string();
        if key.is_empty() {
            break;
        }
        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            value.extend(chars.by_ref().take_while(|c| *c != '"'));
            // Skip up to and including the separator after the closing quote.
            for c in chars.by_ref() {
                if c == ',' {
                    break;
                }
            }
        } else {
            value.extend(chars.by_ref().take_while(|c| *c != ','));
        }
        pairs.push((key, value.trim().to_string()));
    }
    pairs
}

/// A parameter declared by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleParam {
    pub name: String,
    pub param_type: ParamType,
    pub default_value: Option<String>,
    pub description: Option<String>,
}

impl RuleParam {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default_value: None,
            description: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// A rule definition. Immutable for the duration of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Repository-qualified key, e.g. `javascript:S1234`.
    pub key: String,
    pub language: String,
    pub status: RuleStatus,
    pub severity: Severity,
    pub is_template: bool,
    /// Set on custom rules instantiated from a template.
    pub template_id: Option<RuleId>,
    pub params: Vec<RuleParam>,
}

impl Rule {
    pub fn new(id: impl Into<RuleId>, key: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            language: language.into(),
            status: RuleStatus::Ready,
            severity: Severity::Major,
            is_template: false,
            template_id: None,
            params: Vec::new(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_status(mut self, status: RuleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_param(mut self, param: RuleParam) -> Self {
        self.params.push(param);
        self
    }

    pub fn as_template(mut self) -> Self {
        self.is_template = true;
        self
    }

    pub fn from_template(mut self, template_id: impl Into<RuleId>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn param(&self, name: &str) -> Option<&RuleParam> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_default(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(|p| p.default_value.as_deref())
    }

    /// Custom rules carry their parameter values from the template
    /// instantiation and ignore values requested at activation.
    pub fn is_custom(&self) -> bool {
        self.template_id.is_some()
    }

    pub fn is_removed(&self) -> bool {
        self.status == RuleStatus::Removed
    }
}
