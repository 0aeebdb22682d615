//! Configuration validation utilities for the waybill system.
//!
//! This module provides a type-safe framework for validating the TOML
//! configuration tables handed to pluggable backends. It supports
//! hierarchical validation with nested schemas and detailed error reporting,
//! and rejects fields a schema does not declare so config typos surface at
//! startup instead of being silently ignored.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Debug, Error)]
pub enum ValidationError {
	/// Error that occurs when a required field is missing.
	#[error("Missing required field: {0}")]
	MissingField(String),
	/// Error that occurs when a field is present but not declared.
	#[error("Unknown field: {0}")]
	UnknownField(String),
	/// Error that occurs when a field has an invalid value.
	#[error("Invalid value for field '{field}': {message}")]
	InvalidValue { field: String, message: String },
	/// Error that occurs when field type is incorrect.
	#[error("Type mismatch for field '{field}': expected {expected}, got {actual}")]
	TypeMismatch {
		field: String,
		expected: String,
		actual: String,
	},
}

/// Represents the type of a configuration field.
#[derive(Debug)]
pub enum FieldType {
	/// A string value.
	String,
	/// An integer value with optional minimum and maximum bounds.
	Integer {
		/// Minimum allowed value (inclusive).
		min: Option<i64>,
		/// Maximum allowed value (inclusive).
		max: Option<i64>,
	},
	/// A boolean value (true/false).
	Boolean,
	/// An array of values, all of the same type.
	Array(Box<FieldType>),
	/// A nested table with its own schema.
	Table(Schema),
}

/// Represents a field in a configuration schema.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
}

impl Field {
	/// Creates a new field with the given name and type.
	pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
		}
	}
}

/// Defines a validation schema for a TOML configuration table.
///
/// A schema consists of required fields that must be present and optional
/// fields that may be present. Any other field is rejected. Schemas can be
/// nested to validate hierarchical configurations.
#[derive(Debug)]
pub struct Schema {
	pub required: Vec<Field>,
	pub optional: Vec<Field>,
}

impl Schema {
	/// Creates a new schema with required and optional fields.
	pub fn new(required: Vec<Field>, optional: Vec<Field>) -> Self {
		Self { required, optional }
	}

	/// Validates a TOML value against this schema.
	///
	/// Checks that all required fields are present, that every present field
	/// has the declared type, that no undeclared field appears, and descends
	/// into nested tables.
	pub fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let table = config
			.as_table()
			.ok_or_else(|| ValidationError::TypeMismatch {
				field: "root".to_string(),
				expected: "table".to_string(),
				actual: config.type_str().to_string(),
			})?;

		// Check required fields
		for field in &self.required {
			let value = table
				.get(&field.name)
				.ok_or_else(|| ValidationError::MissingField(field.name.clone()))?;
			validate_field_type(&field.name, value, &field.field_type)?;
		}

		// Check optional fields if present
		for field in &self.optional {
			if let Some(value) = table.get(&field.name) {
				validate_field_type(&field.name, value, &field.field_type)?;
			}
		}

		// Reject anything the schema does not declare
		for key in table.keys() {
			let declared = self.required.iter().any(|f| &f.name == key)
				|| self.optional.iter().any(|f| &f.name == key);
			if !declared {
				return Err(ValidationError::UnknownField(key.clone()));
			}
		}

		Ok(())
	}
}

/// Validates that a value matches the expected field type.
///
/// Performs type checking and recursively validates nested structures. For
/// integers it also checks min/max bounds; for arrays it validates each
/// element; for tables it delegates to the nested schema, prefixing the
/// field path in any error it returns.
fn validate_field_type(
	field_name: &str,
	value: &toml::Value,
	expected_type: &FieldType,
) -> Result<(), ValidationError> {
	match expected_type {
		FieldType::String => {
			if !value.is_str() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "string".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
		FieldType::Integer { min, max } => {
			let int_val = value
				.as_integer()
				.ok_or_else(|| ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "integer".to_string(),
					actual: value.type_str().to_string(),
				})?;

			if let Some(min_val) = min {
				if int_val < *min_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is less than minimum {}", int_val, min_val),
					});
				}
			}

			if let Some(max_val) = max {
				if int_val > *max_val {
					return Err(ValidationError::InvalidValue {
						field: field_name.to_string(),
						message: format!("Value {} is greater than maximum {}", int_val, max_val),
					});
				}
			}
		},
		FieldType::Boolean => {
			if !value.is_bool() {
				return Err(ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "boolean".to_string(),
					actual: value.type_str().to_string(),
				});
			}
		},
		FieldType::Array(inner_type) => {
			let array = value
				.as_array()
				.ok_or_else(|| ValidationError::TypeMismatch {
					field: field_name.to_string(),
					expected: "array".to_string(),
					actual: value.type_str().to_string(),
				})?;

			for (i, item) in array.iter().enumerate() {
				validate_field_type(&format!("{}[{}]", field_name, i), item, inner_type)?;
			}
		},
		FieldType::Table(schema) => {
			schema.validate(value).map_err(|e| match e {
				ValidationError::MissingField(f) => {
					ValidationError::MissingField(format!("{}.{}", field_name, f))
				},
				ValidationError::UnknownField(f) => {
					ValidationError::UnknownField(format!("{}.{}", field_name, f))
				},
				ValidationError::InvalidValue { field, message } => ValidationError::InvalidValue {
					field: format!("{}.{}", field_name, field),
					message,
				},
				ValidationError::TypeMismatch {
					field,
					expected,
					actual,
				} => ValidationError::TypeMismatch {
					field: format!("{}.{}", field_name, field),
					expected,
					actual,
				},
			})?;
		},
	}

	Ok(())
}

/// Trait defining a configuration schema that can validate TOML values.
///
/// Implemented by each pluggable backend so the factory can check its
/// configuration table before constructing the implementation.
pub trait ConfigSchema: Send + Sync {
	/// Validates a TOML configuration value against this schema.
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	fn schema() -> Schema {
		Schema::new(
			vec![Field::new("storage_path", FieldType::String)],
			vec![Field::new(
				"format_version",
				FieldType::Integer {
					min: Some(1),
					max: None,
				},
			)],
		)
	}

	#[test]
	fn test_valid_config_passes() {
		let config: toml::Value = toml::from_str(
			r#"
			storage_path = "./data"
			format_version = 2
			"#,
		)
		.unwrap();
		assert!(schema().validate(&config).is_ok());
	}

	#[test]
	fn test_missing_required_field() {
		let config: toml::Value = toml::from_str("format_version = 1").unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "storage_path"));
	}

	#[test]
	fn test_unknown_field_is_rejected() {
		let config: toml::Value = toml::from_str(
			r#"
			storage_path = "./data"
			storge_pth = "typo"
			"#,
		)
		.unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::UnknownField(f) if f == "storge_pth"));
	}

	#[test]
	fn test_integer_bounds() {
		let config: toml::Value = toml::from_str(
			r#"
			storage_path = "./data"
			format_version = 0
			"#,
		)
		.unwrap();
		let err = schema().validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::InvalidValue { field, .. } if field == "format_version"));
	}

	#[test]
	fn test_nested_table_errors_carry_path() {
		let schema = Schema::new(
			vec![Field::new(
				"actors",
				FieldType::Array(Box::new(FieldType::Table(Schema::new(
					vec![
						Field::new("id", FieldType::String),
						Field::new("role", FieldType::String),
					],
					vec![],
				)))),
			)],
			vec![],
		);
		let config: toml::Value = toml::from_str(
			r#"
			[[actors]]
			id = "u-1"
			"#,
		)
		.unwrap();
		let err = schema.validate(&config).unwrap_err();
		assert!(matches!(err, ValidationError::MissingField(f) if f == "actors[0].role"));
	}
}
