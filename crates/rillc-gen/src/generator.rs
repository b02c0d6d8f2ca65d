//! The code generator: allocation state plus one emission method per
//! semantic action.

use std::io;
use std::path::Path;

use rillc_sem::{IdType, Identifier, Location};

use crate::buffer::CodeBuffer;
use crate::runtime::{FOOTER, HEADER};

/// Frame slots occupied by the return address and the saved frame
/// pointer; parameters start above them.
const PARAM_BASE_OFFSET: u32 = 2;

/// Saved local/parameter offsets, captured around nested procedure
/// declarations so the enclosing scope's allocation resumes where it
/// left off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameState {
    local_ptr: u32,
    param_ptr: u32,
}

/// Emits the intermediate representation.
///
/// Registers are named `R[k]` with `k` drawn from a counter that never
/// resets, so every register name in the output is written exactly
/// once. Labels come from a second monotone counter shared by
/// procedure entries, control-flow joins, and call-return points.
pub struct Generator {
    buf: CodeBuffer,
    reg_id: u32,
    label_id: u32,
    local_ptr: u32,
    param_ptr: u32,
    /// Arguments pushed for the call currently being emitted.
    push_count: u32,
    /// Parameters popped since that call returned.
    pop_count: u32,
    debug: bool,
}

impl Generator {
    /// Creates a generator. With `debug` set, human-readable `//`
    /// comments are interleaved with the emitted code.
    pub fn new(debug: bool) -> Self {
        Self {
            buf: CodeBuffer::new(),
            reg_id: 0,
            label_id: 0,
            local_ptr: 0,
            param_ptr: 0,
            push_count: 0,
            pop_count: 0,
            debug,
        }
    }

    // =====================================================================
    // Allocation
    // =====================================================================

    /// Returns a fresh virtual register. The first register is 0.
    pub fn alloc_reg(&mut self) -> u32 {
        let reg = self.reg_id;
        self.reg_id += 1;
        reg
    }

    /// Returns a fresh label id. The first label is 1.
    pub fn fresh_label(&mut self) -> u32 {
        self.label_id += 1;
        self.label_id
    }

    /// Reserves stack cells for a declaration and returns its offset.
    /// Arrays advance the pointer by their size, scalars by one.
    /// Parameters and locals draw from separate pointers.
    pub fn alloc_mem(&mut self, size: Option<u32>, is_param: bool) -> u32 {
        let cells = size.unwrap_or(1);
        if is_param {
            let addr = self.param_ptr;
            self.param_ptr += cells;
            addr
        } else {
            let addr = self.local_ptr;
            self.local_ptr += cells;
            addr
        }
    }

    pub fn reset_local_ptr(&mut self) {
        self.local_ptr = 0;
    }

    pub fn reset_param_ptr(&mut self) {
        self.param_ptr = 0;
    }

    /// Captures the allocation pointers before a nested procedure
    /// declaration.
    pub fn frame_state(&self) -> FrameState {
        FrameState {
            local_ptr: self.local_ptr,
            param_ptr: self.param_ptr,
        }
    }

    /// Restores pointers captured by [`Generator::frame_state`].
    pub fn restore_frame(&mut self, state: FrameState) {
        self.local_ptr = state.local_ptr;
        self.param_ptr = state.param_ptr;
    }

    // =====================================================================
    // Low-level emission
    // =====================================================================

    fn emit(&mut self, line: &str) {
        self.buf.push_line(line);
    }

    /// Emits a `//` comment, but only when debug output is on.
    pub fn comment(&mut self, text: &str) {
        if self.debug {
            self.buf.push_line(&format!("// {text}"));
        }
    }

    pub fn blank_line(&mut self) {
        self.buf.push_line("");
    }

    pub fn tab_push(&mut self) {
        self.buf.tab_push();
    }

    pub fn tab_pop(&mut self) {
        self.buf.tab_pop();
    }

    /// Emits `name:` at the current indentation.
    pub fn label(&mut self, name: &str) {
        self.buf.push_line(&format!("{name}:"));
    }

    /// Emits `goto target;`.
    pub fn jump(&mut self, target: &str) {
        self.emit(&format!("goto {target};"));
    }

    /// Emits the fall-through-on-true branch used by `if` and `for`.
    pub fn cond_jump(&mut self, reg: u32, target: &str) {
        self.emit(&format!("if (!R[{reg}]) goto {target};"));
    }

    // =====================================================================
    // Program structure
    // =====================================================================

    pub fn emit_header(&mut self) {
        self.buf.push_raw(HEADER);
    }

    pub fn emit_footer(&mut self) {
        self.buf.push_raw(FOOTER);
    }

    /// Entry point of the program: its label plus the jump over any
    /// procedure bodies declared before the program body.
    pub fn program_entry(&mut self, name: &str, label: u32) {
        self.entry(name, label);
    }

    /// Entry point of a procedure, same shape as the program's.
    pub fn procedure_entry(&mut self, name: &str, label: u32) {
        self.entry(name, label);
    }

    fn entry(&mut self, name: &str, label: u32) {
        self.label(&format!("{name}_{label}"));
        self.buf.tab_push();
        self.emit(&format!("goto {name}_{label}_body;"));
        self.blank_line();
    }

    /// Start of a body: the `_body` label, local allocation, and (for
    /// the program body) the global base capture.
    pub fn body_entry(&mut self, name: &str, label: u32, local_size: u32, is_program: bool) {
        self.label(&format!("{name}_{label}_body"));
        self.buf.tab_push();
        if local_size > 0 {
            self.comment("allocate locals");
            self.emit(&format!("R[SP] = R[SP] - {local_size};"));
        }
        if is_program {
            self.emit("R[GB] = R[SP];");
        }
    }

    /// Jump back to the caller: unwind locals and follow the return
    /// address saved in the frame.
    pub fn emit_return(&mut self) {
        self.comment("return to caller");
        self.emit("R[SP] = R[FP];");
        self.emit("goto *(void *)MM[R[FP]];");
    }

    /// Closes a procedure body: implicit return, then unwind the two
    /// indentation levels opened by entry and body.
    pub fn procedure_exit(&mut self) {
        self.emit_return();
        self.blank_line();
        self.buf.tab_pop();
        self.buf.tab_pop();
    }

    /// Closes the program body; execution falls through to the footer.
    pub fn program_exit(&mut self) {
        self.buf.tab_pop();
        self.buf.tab_pop();
    }

    // =====================================================================
    // Expressions
    // =====================================================================

    /// Emits `R[r1] = R[r1] op R[r2];`, widening the `int` side first
    /// when exactly one operand is `float`. Returns the destination
    /// register.
    pub fn operation(&mut self, r1: u32, t1: IdType, r2: u32, t2: IdType, op: &str) -> u32 {
        if t1 == IdType::Int && t2 == IdType::Float {
            self.emit(&format!("R[{r1}] = (float)R[{r1}];"));
        } else if t1 == IdType::Float && t2 == IdType::Int {
            self.emit(&format!("R[{r2}] = (float)R[{r2}];"));
        }
        self.emit(&format!("R[{r1}] = R[{r1}] {op} R[{r2}];"));
        r1
    }

    /// Loads an immediate into a fresh register.
    pub fn load_number(&mut self, value: &str, negate: bool) -> u32 {
        let reg = self.alloc_reg();
        if negate {
            self.emit(&format!("R[{reg}] = -{value};"));
        } else {
            self.emit(&format!("R[{reg}] = {value};"));
        }
        reg
    }

    /// Loads a string literal's address into a fresh register.
    pub fn load_string(&mut self, value: &str) -> u32 {
        let reg = self.alloc_reg();
        self.emit(&format!("R[{reg}] = (int)\"{value}\";"));
        reg
    }

    /// Loads a boolean immediate into a fresh register.
    pub fn load_bool(&mut self, value: bool) -> u32 {
        let reg = self.alloc_reg();
        self.emit(&format!("R[{reg}] = {};", u32::from(value)));
        reg
    }

    /// Reads a variable or array element into a fresh register.
    pub fn load_name(&mut self, id: &Identifier, location: Location, index_reg: Option<u32>) -> u32 {
        self.comment(&format!("load {}", id.name));
        let source = Self::mem_ref(id, location, index_reg);
        let reg = self.alloc_reg();
        self.emit(&format!("R[{reg}] = {source};"));
        reg
    }

    /// Bitwise complement in place, for `not`.
    pub fn complement(&mut self, reg: u32) {
        self.emit(&format!("R[{reg}] = ~R[{reg}];"));
    }

    /// Arithmetic negation in place, for `-name` factors.
    pub fn negate(&mut self, reg: u32) {
        self.emit(&format!("R[{reg}] = -R[{reg}];"));
    }

    // =====================================================================
    // Statements
    // =====================================================================

    /// Stores an expression result into a variable or array element.
    pub fn assignment(
        &mut self,
        id: &Identifier,
        location: Location,
        index_reg: Option<u32>,
        expr_reg: u32,
    ) {
        self.comment(&format!("store {}", id.name));
        let target = Self::mem_ref(id, location, index_reg);
        self.emit(&format!("{target} = R[{expr_reg}];"));
    }

    /// Pushes one argument. Argument expressions are all evaluated
    /// before the first push, so `SP` is stable while they run.
    pub fn param_push(&mut self, reg: u32) {
        self.comment("push argument");
        self.emit("R[SP] = R[SP] - 1;");
        self.emit(&format!("MM[R[SP]] = R[{reg}];"));
        self.push_count += 1;
    }

    /// Emits the call: frame setup, jump, return label, and caller
    /// frame restoration. Argument slots stay addressable below the
    /// restored `SP` for the pops that follow.
    pub fn call(&mut self, name: &str, label: u32) {
        let ret = self.fresh_label();
        self.comment(&format!("call {name}"));
        self.emit("R[SP] = R[SP] - 1;");
        self.emit("MM[R[SP]] = R[FP];");
        self.emit("R[SP] = R[SP] - 1;");
        self.emit(&format!("MM[R[SP]] = (int)&&ret_{ret};"));
        self.emit("R[FP] = R[SP];");
        self.emit(&format!("goto {name}_{label};"));
        self.label(&format!("ret_{ret}"));
        self.emit("R[FP] = MM[R[SP] + 1];");
        self.emit(&format!("R[SP] = R[SP] + {};", PARAM_BASE_OFFSET + self.push_count));
        self.pop_count = 0;
    }

    /// Pops the next parameter (in declared order) into a fresh
    /// register after the call returned.
    pub fn param_pop(&mut self, name: &str) -> u32 {
        self.comment(&format!("pop {name}"));
        let reg = self.alloc_reg();
        let offset = self.push_count - self.pop_count;
        self.emit(&format!("R[{reg}] = MM[R[SP] - {offset}];"));
        self.pop_count += 1;
        reg
    }

    /// Writes a popped `out` parameter back to its destination in the
    /// caller's scope.
    pub fn param_store(&mut self, id: &Identifier, location: Location, reg: u32) {
        self.comment(&format!("write back {}", id.name));
        let target = Self::mem_ref(id, location, None);
        self.emit(&format!("{target} = R[{reg}];"));
    }

    /// Finishes a call statement and resets the push/pop bookkeeping.
    pub fn call_end(&mut self) {
        self.push_count = 0;
        self.pop_count = 0;
        self.blank_line();
    }

    // =====================================================================
    // Output
    // =====================================================================

    /// The emitted code so far as one string.
    pub fn contents(&self) -> String {
        self.buf.contents()
    }

    /// Iterates the emitted lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.buf.lines()
    }

    /// Flushes the buffer to the destination file. The driver calls
    /// this only when no errors were reported.
    pub fn commit(&self, path: &Path) -> io::Result<()> {
        self.buf.commit(path)
    }

    /// Memory operand for a variable: the location picks the base
    /// register, the identifier its offset, and arrays add the index
    /// register on top.
    fn mem_ref(id: &Identifier, location: Location, index_reg: Option<u32>) -> String {
        let (base, offset) = match location {
            Location::Global => ("GB", id.address),
            Location::Local => ("SP", id.address),
            Location::Param => ("FP", id.address + PARAM_BASE_OFFSET),
        };
        match index_reg {
            Some(idx) if id.size.is_some() => format!("MM[R[{base}] + {offset} + R[{idx}]]"),
            _ => format!("MM[R[{base}] + {offset}]"),
        }
    }
}
