//! Schema checks for the TOML tables handed to pluggable implementations.
//!
//! Every account and orchestrator implementation publishes a [`ConfigSchema`]
//! describing its `config` table. The loader runs it before the factory sees
//! the table, so a bad key or a malformed address fails at startup with the
//! full dotted path of the offending field.

use alloy::primitives::Address;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
	#[error("Missing required field: {0}")]
	MissingField(String),
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
	#[error("Failed to deserialize config: {0}")]
	DeserializationError(String),
}

impl ValidationError {
	/// Prefixes the field path with the name of the enclosing table.
	fn nested_in(self, parent: &str) -> Self {
		match self {
			Self::MissingField(field) => Self::MissingField(format!("{}.{}", parent, field)),
			Self::InvalidValue { field, message } => Self::InvalidValue {
				field: format!("{}.{}", parent, field),
				message,
			},
			Self::TypeMismatch {
				field,
				expected,
				actual,
			} => Self::TypeMismatch {
				field: format!("{}.{}", parent, field),
				expected,
				actual,
			},
			other => other,
		}
	}
}

#[derive(Debug)]
pub enum FieldType {
	String,
	Integer { min: Option<i64>, max: Option<i64> },
	Boolean,
	/// A `0x`-prefixed 20-byte address.
	Address,
	/// `0x`-prefixed hex; `bytes` pins the decoded length when set.
	Hex { bytes: Option<usize> },
	/// An `http://` or `https://` URL.
	Url,
	Array(Box<FieldType>),
	Table(Schema),
}

pub type FieldValidator = Box<dyn Fn(&toml::Value) -> Result<(), String> + Send + Sync>;

pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub validator: Option<FieldValidator>,
}

impl std::fmt::Debug for Field {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Field")
			.field("name", &self.name)
			.field("field_type", &self.field_type)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl Field {
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			validator: None,
		}
	}

	/// Adds a check that runs after the type check passes.
	pub fn with_validator<F>(mut self, validator: F) -> Self
	where
		F: Fn(&toml::Value) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(validator));
		self
	}

	fn check(&self, value: &toml::Value) -> Result<(), ValidationError> {
		validate_field_type(&self.name, value, &self.field_type)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(|message| ValidationError::InvalidValue {
				field: self.name.clone(),
				message,
			})?;
		}
		Ok(())
	}
}

#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| mismatch("root", "table", config))?;

		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			field.check(value)?;
		}

		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				field.check(value)?;
			}
		}

		Ok(())
	}
}

fn mismatch(field: &str, expected: &str, value: &toml::Value) -> ValidationError {
	ValidationError::TypeMismatch {
		field: field.to_string(),
		expected: expected.to_string(),
		actual: value.type_str().to_string(),
	}
}

fn invalid(field: &str, message: impl Into<String>) -> ValidationError {
	ValidationError::InvalidValue {
		field: field.to_string(),
		message: message.into(),
	}
}

fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "string", value))?;
		}
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| mismatch(field_name, "integer", value))?;
			if let Some(min_val) = min.filter(|min_val| int_val < *min_val) {
				return Err(invalid(
					field_name,
					format!("Value {} is less than minimum {}", int_val, min_val),
				));
			}
			if let Some(max_val) = max.filter(|max_val| int_val > *max_val) {
				return Err(invalid(
					field_name,
					format!("Value {} is greater than maximum {}", int_val, max_val),
				));
			}
		}
		FieldType::Boolean => {
			value
				.as_bool()
				.ok_or_else(|| mismatch(field_name, "boolean", value))?;
		}
		FieldType::Address => {
			let text = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "address string", value))?;
			if !text.starts_with("0x") {
				return Err(invalid(field_name, "Address must start with 0x"));
			}
			Address::from_str(text)
				.map_err(|e| invalid(field_name, format!("Invalid address: {}", e)))?;
		}
		FieldType::Hex { bytes } => {
			let text = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "hex string", value))?;
			let digits = text
				.strip_prefix("0x")
				.ok_or_else(|| invalid(field_name, "Hex value must start with 0x"))?;
			if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
				return Err(invalid(field_name, "Not a valid hex byte string"));
			}
			if let Some(expected) = bytes.filter(|expected| digits.len() / 2 != *expected) {
				return Err(invalid(
					field_name,
					format!("Expected {} bytes, got {}", expected, digits.len() / 2),
				));
			}
		}
		FieldType::Url => {
			let text = value
				.as_str()
				.ok_or_else(|| mismatch(field_name, "url string", value))?;
			if !(text.starts_with("http://") || text.starts_with("https://")) {
				return Err(invalid(field_name, "URL must use http:// or https://"));
			}
		}
		FieldType::Array(inner_type) => {
			let array = value
				.as_array()
				.ok_or_else(|| mismatch(field_name, "array", value))?;
			for (i, item) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
		}
		FieldType::Table(schema) => {
			schema
				.validate(value)
				.map_err(|e| e.nested_in(field_name))?;
		}
	}

	Ok(())
}

/// Implemented by every pluggable component to describe its `config` table.
pub trait ConfigSchema: Send + Sync {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn account_schema() -> Schema {
		Schema::new(
			vec![Field::new("private_key", FieldType::Hex { bytes: Some(32) })],
			vec![
				Field::new("address", FieldType::Address),
				Field::new("endpoint", FieldType::Url),
				Field::new(
					"counterfactual",
					FieldType::Table(Schema::new(
						vec![
							Field::new("factory", FieldType::Address),
							Field::new("salt", FieldType::Hex { bytes: Some(32) }),
						],
						vec![],
					)),
				),
				Field::new(
					"poll_ms",
					FieldType::Integer {
						min: Some(1),
						max: None,
					},
				),
			],
		)
	}

	#[test]
	fn test_accepts_valid_table() {
		let config: toml::Value = toml::from_str(&format!(
			r#"
			private_key = "0x{key}"
			address = "0x0000000000E9E6E96Bcaa3c113187CdB7E38AED9"
			endpoint = "https://example.org"
			poll_ms = 500

			[counterfactual]
			factory = "0x0000000000000000000000000000000000000001"
			salt = "0x{key}"
			"#,
			key = "11".repeat(32)
		))
		.unwrap();

		account_schema().validate(&config).unwrap();
	}

	#[test]
	fn test_reports_nested_path() {
		let config: toml::Value = toml::from_str(&format!(
			r#"
			private_key = "0x{key}"

			[counterfactual]
			factory = "0x0000000000000000000000000000000000000001"
			salt = "0x1234"
			"#,
			key = "11".repeat(32)
		))
		.unwrap();

		match account_schema().validate(&config) {
			Err(ValidationError::InvalidValue { field, .. }) => {
				assert_eq!(field, "counterfactual.salt")
			}
			other => panic!("unexpected result: {:?}", other),
		}
	}

	#[test]
	fn test_rejects_bad_scalars() {
		let missing: toml::Value = toml::from_str("address = \"0x01\"").unwrap();
		assert!(matches!(
			account_schema().validate(&missing),
			Err(ValidationError::MissingField(f)) if f == "private_key"
		));

		let key = format!("0x{}", "11".repeat(32));
		let bad_address: toml::Value =
			toml::from_str(&format!("private_key = \"{}\"\naddress = \"0x1234\"", key)).unwrap();
		assert!(account_schema().validate(&bad_address).is_err());

		let bad_url: toml::Value =
			toml::from_str(&format!("private_key = \"{}\"\nendpoint = \"ftp://x\"", key)).unwrap();
		assert!(account_schema().validate(&bad_url).is_err());

		let zero_poll: toml::Value =
			toml::from_str(&format!("private_key = \"{}\"\npoll_ms = 0", key)).unwrap();
		assert!(matches!(
			account_schema().validate(&zero_poll),
			Err(ValidationError::InvalidValue { field, .. }) if field == "poll_ms"
		));
	}
}
