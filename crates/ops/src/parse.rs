//! Raw chain-step parsing.
//!
//! The `applyChain` mutation carries untyped `(opCode, args)` pairs. The
//! args string is classified before anything else happens: `{` means a
//! JSON object of named arguments, `[` means a JSON array (only meaningful
//! for operations whose sole required parameter is a list), anything else
//! is a bare literal for operations with a single required string
//! parameter. Malformed JSON and schema mismatches are `InvalidArgument`;
//! no raw client string ever reaches the engine as a method name.

use serde::de::DeserializeOwned;

use ladder_common::{Error, Result};

use crate::op::{GrainArgs, GroupByArgs, LocArgs, Operation};

/// Parse one raw `(opCode, args)` step into a registered operation.
pub fn parse_step(op_code: &str, args: Option<&str>) -> Result<Operation> {
    let args = args.map(str::trim).filter(|s| !s.is_empty());
    match op_code {
        "grain" => match args {
            Some(s) if s.starts_with('{') => Ok(Operation::Grain(from_json(op_code, s)?)),
            Some(s) if s.starts_with('[') => Err(bad_args(op_code, "takes named arguments")),
            Some(s) => Ok(Operation::Grain(GrainArgs {
                grain: s.to_string(),
                trailing: false,
            })),
            None => Err(bad_args(op_code, "requires a grain, e.g. \"OQDQ\"")),
        },
        "trend" => match args {
            Some(s) if s.starts_with('{') => Ok(Operation::Trend(from_json(op_code, s)?)),
            Some(_) => Err(bad_args(op_code, "takes named arguments, e.g. {\"trend\": 0.05}")),
            None => Err(bad_args(op_code, "requires a trend rate")),
        },
        "groupBy" => match args {
            Some(s) if s.starts_with('{') => Ok(Operation::GroupBy(from_json(op_code, s)?)),
            Some(s) if s.starts_with('[') => {
                let by: Vec<String> = from_json(op_code, s)?;
                Ok(Operation::GroupBy(GroupByArgs {
                    by,
                    aggregation: ladder_engine::Aggregation::Sum,
                }))
            },
            Some(_) => Err(bad_args(op_code, "takes a key list or named arguments")),
            None => Err(bad_args(op_code, "requires the keys to group by")),
        },
        "loc" => match args {
            Some(s) if s.starts_with('{') => Ok(Operation::Loc(from_json(op_code, s)?)),
            Some(_) => Err(bad_args(op_code, "takes named filter clauses")),
            None => Ok(Operation::Loc(LocArgs::default())),
        },
        "valToDev" => no_args(op_code, args, Operation::ValToDev),
        "devToVal" => no_args(op_code, args, Operation::DevToVal),
        "incrToCum" => no_args(op_code, args, Operation::IncrToCum),
        "cumToIncr" => no_args(op_code, args, Operation::CumToIncr),
        "latestDiagonal" => no_args(op_code, args, Operation::LatestDiagonal),
        "linkRatio" => no_args(op_code, args, Operation::LinkRatio),
        "dropNa" => no_args(op_code, args, Operation::DropNa),
        "copy" => no_args(op_code, args, Operation::Copy),
        unknown => Err(Error::invalid_argument(format!(
            "unknown operation '{unknown}'"
        ))),
    }
}

/// Parse a whole raw chain, preserving order.
pub fn parse_chain(steps: &[(String, Option<String>)]) -> Result<Vec<Operation>> {
    steps
        .iter()
        .map(|(op, args)| parse_step(op, args.as_deref()))
        .collect()
}

fn from_json<T: DeserializeOwned>(op_code: &str, s: &str) -> Result<T> {
    serde_json::from_str(s)
        .map_err(|e| Error::invalid_argument(format!("bad arguments for {op_code}: {e}")))
}

fn no_args(op_code: &str, args: Option<&str>, op: Operation) -> Result<Operation> {
    match args {
        None => Ok(op),
        Some(_) => Err(bad_args(op_code, "takes no arguments")),
    }
}

fn bad_args(op_code: &str, detail: &str) -> Error {
    Error::invalid_argument(format!("{op_code} {detail}"))
}
