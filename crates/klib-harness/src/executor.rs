//! Fixture execution: a function name plus JSON inputs, run against
//! `klib-core`, rendered to the string a fixture's `expected_output` holds.
//!
//! Output conventions:
//! - C strings render up to their NUL; raw buffers render in full.
//!   Non-printable bytes are escaped as `\xNN`.
//! - Comparisons render their sign: `<0`, `0`, `>0`.
//! - The `printf` family renders `<return>|<text>`; formatter errors render
//!   `error:<message>`.
//! - Fatal conditions (panics) render `fatal:<message>`.
//!
//! Destination buffers start filled with `.` so untouched bytes are visible.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use klib_core::FormatError;
use klib_core::stdio::{self, FormatArg, FormatPolicy};
use klib_core::stdlib;
use klib_core::string::{self, CompareBound};
use klib_membrane::SafetyLevel;

use crate::error::HarnessError;

const FILL: u8 = b'.';
const DEFAULT_BUF_LEN: usize = 256;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// A formatter argument as written in fixtures (`{"int": 42}`) or on the
/// command line (`int:42`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgSpec {
    Int(i32),
    Uint(u32),
    Str(String),
}

impl ArgSpec {
    /// Parses `int:N`, `uint:N` or `str:TEXT`.
    pub fn parse_cli(text: &str) -> Result<Self, HarnessError> {
        let invalid = || HarnessError::InvalidArgument(text.to_string());
        let (kind, value) = text.split_once(':').ok_or_else(invalid)?;
        match kind {
            "int" => value.parse().map(Self::Int).map_err(|_| invalid()),
            "uint" => value.parse().map(Self::Uint).map_err(|_| invalid()),
            "str" => Ok(Self::Str(value.to_string())),
            _ => Err(invalid()),
        }
    }

    #[must_use]
    pub fn as_format_arg(&self) -> FormatArg<'_> {
        match self {
            Self::Int(v) => FormatArg::Int(*v),
            Self::Uint(v) => FormatArg::Uint(*v),
            Self::Str(s) => FormatArg::Str(s.as_bytes()),
        }
    }
}

/// Formatter policy for a mode name (`strict`, `hardened`, ...).
#[must_use]
pub fn policy_for_mode(mode: &str) -> FormatPolicy {
    FormatPolicy::for_level(SafetyLevel::from_str_loose(mode))
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StrlenIn {
    s: String,
}

#[derive(Debug, Deserialize)]
struct StrcpyIn {
    src: String,
    dst_len: usize,
}

/// `strncpy` and `memcpy`.
#[derive(Debug, Deserialize)]
struct CopyNIn {
    src: String,
    dst_len: usize,
    n: usize,
}

#[derive(Debug, Deserialize)]
struct StrcatIn {
    dst: String,
    src: String,
    dst_len: usize,
}

#[derive(Debug, Deserialize)]
struct CmpIn {
    a: String,
    b: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BoundIn {
    Inherited,
    Standard,
}

/// `strncmp` and `memcmp`.
#[derive(Debug, Deserialize)]
struct CmpNIn {
    a: String,
    b: String,
    n: usize,
    #[serde(default)]
    bound: Option<BoundIn>,
}

impl CmpNIn {
    fn bound(&self) -> CompareBound {
        match self.bound {
            Some(BoundIn::Standard) => CompareBound::Standard,
            Some(BoundIn::Inherited) | None => CompareBound::Inherited,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MemsetIn {
    len: usize,
    value: i32,
    n: usize,
}

#[derive(Debug, Deserialize)]
struct MemmoveIn {
    buf: String,
    dst: usize,
    src: usize,
    n: usize,
}

#[derive(Debug, Deserialize)]
struct ItoaIn {
    value: i32,
    radix: u32,
}

#[derive(Debug, Deserialize)]
struct UitoaIn {
    value: u32,
    radix: u32,
}

#[derive(Debug, Deserialize)]
struct SprintfIn {
    format: String,
    #[serde(default)]
    args: Vec<ArgSpec>,
    #[serde(default)]
    buf_len: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct SnprintfIn {
    format: String,
    #[serde(default)]
    args: Vec<ArgSpec>,
    n: usize,
}

#[derive(Debug, Deserialize)]
struct PrintfIn {
    format: String,
    #[serde(default)]
    args: Vec<ArgSpec>,
}

#[derive(Debug)]
enum Operation {
    Strlen(StrlenIn),
    Strcpy(StrcpyIn),
    Strncpy(CopyNIn),
    Strcat(StrcatIn),
    Strcmp(CmpIn),
    Strncmp(CmpNIn),
    Memset(MemsetIn),
    Memmove(MemmoveIn),
    Memcpy(CopyNIn),
    Memcmp(CmpNIn),
    Itoa(ItoaIn),
    Uitoa(UitoaIn),
    Sprintf(SprintfIn),
    Snprintf { input: SnprintfIn, va_list: bool },
    Printf(PrintfIn),
}

fn inputs<T: DeserializeOwned>(function: &str, value: &Value) -> Result<T, HarnessError> {
    T::deserialize(value).map_err(|e| HarnessError::InvalidInput {
        function: function.to_string(),
        message: e.to_string(),
    })
}

impl Operation {
    fn parse(function: &str, value: &Value) -> Result<Self, HarnessError> {
        let op = match function {
            "strlen" => Self::Strlen(inputs(function, value)?),
            "strcpy" => Self::Strcpy(inputs(function, value)?),
            "strncpy" => Self::Strncpy(inputs(function, value)?),
            "strcat" => Self::Strcat(inputs(function, value)?),
            "strcmp" => Self::Strcmp(inputs(function, value)?),
            "strncmp" => Self::Strncmp(inputs(function, value)?),
            "memset" => Self::Memset(inputs(function, value)?),
            "memmove" => Self::Memmove(inputs(function, value)?),
            "memcpy" => Self::Memcpy(inputs(function, value)?),
            "memcmp" => Self::Memcmp(inputs(function, value)?),
            "itoa" => Self::Itoa(inputs(function, value)?),
            "uitoa" => Self::Uitoa(inputs(function, value)?),
            "sprintf" | "vsprintf" => Self::Sprintf(inputs(function, value)?),
            "snprintf" => Self::Snprintf {
                input: inputs(function, value)?,
                va_list: false,
            },
            "vsnprintf" => Self::Snprintf {
                input: inputs(function, value)?,
                va_list: true,
            },
            "printf" => Self::Printf(inputs(function, value)?),
            other => return Err(HarnessError::UnknownFunction(other.to_string())),
        };
        Ok(op)
    }

    fn run(&self, policy: FormatPolicy) -> String {
        match self {
            Self::Strlen(i) => string::strlen(&c_string(&i.s)).to_string(),
            Self::Strcpy(i) => {
                let mut dst = vec![FILL; i.dst_len];
                string::strcpy(&mut dst, &c_string(&i.src));
                escape_c_str(&dst)
            }
            Self::Strncpy(i) => {
                let mut dst = vec![FILL; i.dst_len];
                string::strncpy(&mut dst, &c_string(&i.src), i.n);
                escape(&dst)
            }
            Self::Strcat(i) => {
                let mut dst = vec![FILL; i.dst_len];
                string::strcpy(&mut dst, &c_string(&i.dst));
                string::strcat(&mut dst, &c_string(&i.src));
                escape_c_str(&dst)
            }
            Self::Strcmp(i) => sign(string::strcmp(&c_string(&i.a), &c_string(&i.b))),
            Self::Strncmp(i) => sign(string::strncmp_with(
                &c_string(&i.a),
                &c_string(&i.b),
                i.n,
                i.bound(),
            )),
            Self::Memset(i) => {
                let mut buf = vec![FILL; i.len];
                string::memset(&mut buf, i.value, i.n);
                escape(&buf)
            }
            Self::Memmove(i) => {
                let mut buf = i.buf.as_bytes().to_vec();
                string::memmove(&mut buf, i.dst, i.src, i.n);
                escape(&buf)
            }
            Self::Memcpy(i) => {
                let mut dst = vec![FILL; i.dst_len];
                string::memcpy(&mut dst, i.src.as_bytes(), i.n);
                escape(&dst)
            }
            Self::Memcmp(i) => sign(string::memcmp_with(
                i.a.as_bytes(),
                i.b.as_bytes(),
                i.n,
                i.bound(),
            )),
            Self::Itoa(i) => {
                let mut buf = [FILL; 40];
                let end = stdlib::itoa(i.value, &mut buf, i.radix);
                escape(&buf[..end - 1])
            }
            Self::Uitoa(i) => {
                let mut buf = [FILL; 40];
                let end = stdlib::uitoa(i.value, &mut buf, i.radix);
                escape(&buf[..end - 1])
            }
            Self::Sprintf(i) => {
                let args = format_args(&i.args);
                let mut out = vec![FILL; i.buf_len.unwrap_or(DEFAULT_BUF_LEN)];
                let result = stdio::vsprintf_with(&mut out, i.format.as_bytes(), &args, policy);
                printed(result, &out)
            }
            Self::Snprintf { input, va_list } => {
                let args = format_args(&input.args);
                let mut out = vec![FILL; input.n];
                let fmt = input.format.as_bytes();
                let result = if *va_list {
                    stdio::vsnprintf_with(&mut out, input.n, fmt, &args, policy)
                } else {
                    stdio::snprintf_with(&mut out, input.n, fmt, &args, policy)
                };
                printed(result, &out)
            }
            Self::Printf(i) => {
                let args = format_args(&i.args);
                let mut line = Vec::new();
                let mut console = |bytes: &[u8]| line.extend_from_slice(bytes);
                let result = stdio::printf_with(&mut console, i.format.as_bytes(), &args, policy);
                match result {
                    Ok(n) => format!("{n}|{}", escape(&line)),
                    Err(err) => format!("error:{err}"),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Runs one fixture case under `mode` and renders its output.
///
/// Input-shape problems are errors; everything the library itself does,
/// including fatal conditions, is rendered output.
pub fn execute_fixture_case(
    function: &str,
    inputs: &Value,
    mode: &str,
) -> Result<String, HarnessError> {
    let policy = policy_for_mode(mode);
    let op = Operation::parse(function, inputs)?;
    let output = match panic::catch_unwind(AssertUnwindSafe(|| op.run(policy))) {
        Ok(output) => output,
        Err(payload) => format!("fatal:{}", panic_message(payload.as_ref())),
    };
    Ok(output)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else {
        String::from("panic")
    }
}

// ---------------------------------------------------------------------------
// Rendering helpers
// ---------------------------------------------------------------------------

fn c_string(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    bytes
}

fn format_args(args: &[ArgSpec]) -> Vec<FormatArg<'_>> {
    args.iter().map(ArgSpec::as_format_arg).collect()
}

fn sign(v: i32) -> String {
    match v.signum() {
        -1 => "<0",
        0 => "0",
        _ => ">0",
    }
    .to_string()
}

fn printed(result: Result<usize, FormatError>, out: &[u8]) -> String {
    match result {
        Ok(n) => format!("{n}|{}", escape_c_str(out)),
        Err(err) => format!("error:{err}"),
    }
}

/// Escapes every byte that is not printable ASCII.
#[must_use]
pub fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(b)),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out
}

fn escape_c_str(bytes: &[u8]) -> String {
    escape(&bytes[..string::strlen(bytes)])
}
