use std::rc::Rc;

use crate::{
    chunk::Chunk,
    value::Value,
    vm::{VM, errors::VMError},
};

impl VM {
    /// Reads a global-opcode operand and resolves it to the variable name
    /// in the constant pool. Cloning the `Rc` shares the text's storage
    /// with the pool instead of copying it.
    fn read_global_name(&mut self, chunk: &Chunk, width: usize) -> Result<Rc<str>, VMError> {
        let index = self.read_index(chunk, width)?;
        match chunk.constant(index) {
            Some(Value::String(name)) => Ok(Rc::clone(name)),
            _ => Err(self.construct_runtime_error(
                chunk,
                format_args!("Malformed bytecode: global name is not a string."),
            )),
        }
    }

    /// Defines a global with the value `nil`. Emitted for `var x;`, so
    /// there is no initializer to pop.
    pub(super) fn op_ndf_global(&mut self, chunk: &Chunk, width: usize) -> Result<(), VMError> {
        let name = self.read_global_name(chunk, width)?;
        // Redefinition is allowed and overwrites
        self.globals.insert(name, Value::Nil);
        Ok(())
    }

    /// Defines a global with the initializer sitting on top of the stack
    pub(super) fn op_def_global(&mut self, chunk: &Chunk, width: usize) -> Result<(), VMError> {
        let name = self.read_global_name(chunk, width)?;
        let value = self.pop(chunk)?;
        self.globals.insert(name, value);
        Ok(())
    }

    /// Pushes the value of a global onto the stack
    pub(super) fn op_get_global(&mut self, chunk: &Chunk, width: usize) -> Result<(), VMError> {
        let name = self.read_global_name(chunk, width)?;
        let value = self.globals.get(&*name).cloned().ok_or_else(|| {
            self.construct_runtime_error(chunk, format_args!("Undefined variable '{name}'"))
        })?;
        self.push(chunk, value)
    }

    /// Stores the top of the stack in an existing global. The value is
    /// peeked, not popped: assignment is an expression and its value may
    /// still be consumed. Assigning to a name that was never defined is an
    /// error, it does not implicitly define it.
    pub(super) fn op_set_global(&mut self, chunk: &Chunk, width: usize) -> Result<(), VMError> {
        let name = self.read_global_name(chunk, width)?;

        let value = self.peek_top(chunk)?.clone();

        if !self.globals.contains_key(&*name) {
            return Err(
                self.construct_runtime_error(chunk, format_args!("Undefined variable '{name}'"))
            );
        }
        self.globals.insert(name, value);

        Ok(())
    }
}
