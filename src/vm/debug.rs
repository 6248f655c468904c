use crate::{chunk::Chunk, debug::Debug, vm::VM};

impl VM {
    /// Dumps the stack and disassembles the instruction about to execute.
    /// Runs before each dispatch when tracing is on.
    pub(super) fn trace_instruction(&self, chunk: &Chunk) {
        print!("          ");
        for value in &self.stack {
            print!("[ {value} ]");
        }
        println!();

        let mut text = String::new();
        Debug::disassemble_instruction(chunk, self.ip, &mut text);
        print!("{text}");
    }
}
