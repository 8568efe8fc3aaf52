use serde::Serialize;

/// A single rejected field of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub problem: String,
}

/// Every problem found while validating one request, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", describe(.fields))]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: &str, problem: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push(field, problem);
        err
    }

    pub fn push(&mut self, field: &str, problem: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.to_string(),
            problem: problem.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of the offending fields.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|e| format!("{}: {}", e.field, e.problem))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    NotFound(String),
}

impl RegistryError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_names_every_field() {
        let mut err = ValidationError::single("node_name", "missing");
        err.push("port", "expected an integer between 0 and 65535");

        assert_eq!(
            err.to_string(),
            "node_name: missing; port: expected an integer between 0 and 65535"
        );
        assert_eq!(err.field_names(), vec!["node_name", "port"]);
    }
}
