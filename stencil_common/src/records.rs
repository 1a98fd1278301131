//! Instruction records as emitted by the data-flow-graph extraction pass.
//!
//! The input document is a JSON list. Each element is either an instruction
//!
//! ```json
//! { "pointer": "0x5581", "opcode": "add", "operands": [ ... ] }
//! ```
//!
//! or an escape marker for a value used outside its block
//!
//! ```json
//! { "pointer": "0x55a0", "description": "out", "value": "0x5581" }
//! ```
//!
//! Operand descriptors are resolved once, here, into the closed [`Operand`]
//! union; nothing downstream branches on description strings.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::LoadError;

/// One operand of an instruction record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "description", rename_all = "kebab-case")]
pub enum Operand {
    /// Result of another instruction in the same block.
    Instruction {
        /// Pointer of the producing instruction.
        value: String,
    },
    /// Result of an instruction outside the block (or a phi).
    InstructionExternal {
        /// Pointer of the producing instruction.
        #[serde(default)]
        value: Option<String>,
    },
    /// An immediate.
    Constant {
        /// Literal value, kept for reference only.
        #[serde(default)]
        value: Value,
    },
    /// A function parameter.
    Argument {
        /// Pointer of the parameter.
        value: String,
        /// Declared parameter position.
        #[serde(default, rename = "argument_number_in_function")]
        argument_number: Option<usize>,
    },
    /// An address not otherwise introduced (globals, function addresses).
    Pointer {
        /// The referenced address.
        value: String,
    },
}

/// A resolved input record.
#[derive(Clone, Debug, PartialEq)]
pub enum InstructionRecord {
    /// An instruction vertex with its operands in slot order.
    Instruction {
        /// Unique pointer-like id.
        pointer: String,
        /// Instruction mnemonic.
        opcode: String,
        /// Operands in slot order.
        operands: Vec<Operand>,
    },
    /// The value `value` escapes the graph.
    Out {
        /// Pointer of the escaping user, when recorded.
        pointer: Option<String>,
        /// Pointer of the escaping value.
        value: String,
    },
}

impl InstructionRecord {
    /// The record's own pointer, when it has one.
    #[must_use]
    pub fn pointer(&self) -> Option<&str> {
        match self {
            Self::Instruction { pointer, .. } => Some(pointer),
            Self::Out { pointer, .. } => pointer.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct RawInstruction {
    pointer: String,
    opcode: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    operands: Vec<Operand>,
}

#[derive(Deserialize)]
struct RawOut {
    #[serde(default)]
    pointer: Option<String>,
    value: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Operand>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Operand>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Parse a list of records from JSON text.
///
/// # Errors
///
/// Fails on invalid JSON, on a non-list document, and on the first record
/// missing a required field; the error names the record's position and
/// pointer.
pub fn parse_records(text: &str) -> Result<Vec<InstructionRecord>, LoadError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(items) = document else {
        return Err(LoadError::NotAList(json_kind(&document)));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| resolve_record(index, item))
        .collect()
}

/// Read and parse a record file.
///
/// # Errors
///
/// See [`parse_records`]; additionally fails when the file cannot be read.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<InstructionRecord>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;
    parse_records(&text)
}

fn resolve_record(index: usize, item: Value) -> Result<InstructionRecord, LoadError> {
    let pointer = item
        .get("pointer")
        .and_then(Value::as_str)
        .unwrap_or("<unknown>")
        .to_owned();
    let malformed = |reason: String| LoadError::MalformedRecord {
        index,
        pointer: pointer.clone(),
        reason,
    };

    if !item.is_object() {
        return Err(malformed(format!("expected an object, found {}", json_kind(&item))));
    }

    let is_out = item.get("description").and_then(Value::as_str) == Some("out");
    if is_out {
        let raw: RawOut = serde_json::from_value(item).map_err(|e| malformed(e.to_string()))?;
        Ok(InstructionRecord::Out {
            pointer: raw.pointer,
            value: raw.value,
        })
    } else {
        let raw: RawInstruction =
            serde_json::from_value(item).map_err(|e| malformed(e.to_string()))?;
        Ok(InstructionRecord::Instruction {
            pointer: raw.pointer,
            opcode: raw.opcode,
            operands: raw.operands,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_operand_kind() {
        let text = r#"[
            {"pointer": "p1", "opcode": "add", "text": "%3 = add", "type": "i32", "operands": [
                {"description": "instruction", "value": "p0", "type": "i32"},
                {"description": "instruction-external", "value": "p9"},
                {"description": "constant", "value": 4},
                {"description": "argument", "value": "a0", "argument_number_in_function": 2},
                {"description": "pointer", "value": "g0"}
            ]}
        ]"#;
        let records = parse_records(text).unwrap();
        let InstructionRecord::Instruction { operands, .. } = &records[0] else {
            panic!("expected instruction");
        };
        assert_eq!(operands.len(), 5);
        assert_eq!(
            operands[3],
            Operand::Argument {
                value: "a0".into(),
                argument_number: Some(2)
            }
        );
        assert!(matches!(operands[2], Operand::Constant { .. }));
    }

    #[test]
    fn null_operands_are_empty() {
        let records =
            parse_records(r#"[{"pointer": "p", "opcode": "ret", "operands": null}]"#).unwrap();
        assert_eq!(
            records[0],
            InstructionRecord::Instruction {
                pointer: "p".into(),
                opcode: "ret".into(),
                operands: vec![]
            }
        );
    }

    #[test]
    fn out_records_are_recognised() {
        let records =
            parse_records(r#"[{"pointer": "u", "description": "out", "value": "p"}]"#).unwrap();
        assert_eq!(
            records[0],
            InstructionRecord::Out {
                pointer: Some("u".into()),
                value: "p".into()
            }
        );
    }

    #[test]
    fn missing_opcode_names_the_record() {
        let err = parse_records(r#"[{"pointer": "ok", "opcode": "add"}, {"pointer": "bad"}]"#)
            .unwrap_err();
        match err {
            LoadError::MalformedRecord { index, pointer, .. } => {
                assert_eq!(index, 1);
                assert_eq!(pointer, "bad");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unknown_operand_kind_is_rejected() {
        let err = parse_records(
            r#"[{"pointer": "p", "opcode": "add", "operands": [{"description": "label"}]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::MalformedRecord { index: 0, .. }));
    }

    #[test]
    fn document_must_be_a_list() {
        let err = parse_records(r#"{"pointer": "p"}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAList("an object")));
    }
}
