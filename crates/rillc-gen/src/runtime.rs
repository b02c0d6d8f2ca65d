//! The runtime library: pre-declared I/O procedures and the fixed
//! header and footer text surrounding generated code.
//!
//! The runtime functions are a closed set. Their identifiers are
//! injected into the global scope before parsing begins, so user code
//! calls them like any declared procedure; their bodies are part of the
//! header text and all carry label id 1 (the label counter starts
//! above that for user code, and runtime labels are disambiguated by
//! name).

use indexmap::IndexMap;
use rillc_sem::{Direction, IdType};

/// One parameter of a runtime function.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeParam {
    pub name: &'static str,
    pub ty: IdType,
    pub direction: Direction,
}

/// The runtime-function table, in injection order.
pub fn runtime_functions() -> IndexMap<&'static str, Vec<RuntimeParam>> {
    fn reads(ty: IdType) -> Vec<RuntimeParam> {
        vec![RuntimeParam {
            name: "val",
            ty,
            direction: Direction::Out,
        }]
    }
    fn writes(ty: IdType) -> Vec<RuntimeParam> {
        vec![RuntimeParam {
            name: "val",
            ty,
            direction: Direction::In,
        }]
    }

    let mut table = IndexMap::new();
    table.insert("get_bool", reads(IdType::Bool));
    table.insert("get_int", reads(IdType::Int));
    table.insert("get_float", reads(IdType::Float));
    table.insert("get_str", reads(IdType::Str));
    table.insert("put_bool", writes(IdType::Bool));
    table.insert("put_int", writes(IdType::Int));
    table.insert("put_float", writes(IdType::Float));
    table.insert("put_str", writes(IdType::Str));
    table
}

/// Fixed prologue. Declares the register file and memory, pins the
/// stack, frame, and global base registers at the top of the register
/// file, defines the runtime-function bodies, and jumps over them to
/// the `_start` guard where generated code begins.
///
/// The text must stay byte-stable across releases; generated output is
/// compared verbatim by downstream tooling.
pub const HEADER: &str = r#"// Generated by rillc. Do not edit.
// Build with a compiler that supports labels as values (gcc, clang).
#include <stdio.h>
#include <stdlib.h>
#include <string.h>

#define MM_SIZE 32768
#define REG_COUNT 4096
#define SP (REG_COUNT - 1)
#define FP (REG_COUNT - 2)
#define GB (REG_COUNT - 3)

static int MM[MM_SIZE];
static int R[REG_COUNT];
static char SBUF[256];

int main(void) {
	R[SP] = MM_SIZE - 1;
	R[FP] = MM_SIZE - 1;
	R[GB] = MM_SIZE - 1;
	goto _start;

get_bool_1:
	scanf("%d", &MM[R[FP] + 2]);
	MM[R[FP] + 2] = MM[R[FP] + 2] != 0;
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

get_int_1:
	scanf("%d", &MM[R[FP] + 2]);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

get_float_1:
	scanf("%f", (float *)&MM[R[FP] + 2]);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

get_str_1:
	scanf("%255s", SBUF);
	MM[R[FP] + 2] = (int)strdup(SBUF);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

put_bool_1:
	printf("%d\n", MM[R[FP] + 2] != 0);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

put_int_1:
	printf("%d\n", MM[R[FP] + 2]);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

put_float_1:
	printf("%f\n", *(float *)&MM[R[FP] + 2]);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

put_str_1:
	printf("%s\n", (char *)MM[R[FP] + 2]);
	R[SP] = R[FP];
	goto *(void *)MM[R[FP]];

_start:;
"#;

/// Fixed epilogue: execution falls off the end of the program body and
/// returns from `main`.
pub const FOOTER: &str = "\treturn 0;\n}\n";
