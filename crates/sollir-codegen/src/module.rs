use crate::ast::{EventDecl, FunctionDecl, SourceUnit};
use crate::errors::{CodegenError, Result};
use crate::options::CodegenOptions;
use crate::types::TypeCache;
use sha2::{Digest, Sha256};
use sollir_core::{
    Constant, Contract, EventDefinition, EventId, EventParameter, Function, FunctionBuilder,
    FunctionSignature, Parameter, Value,
};
use std::collections::HashMap;
use tiny_keccak::{Hasher, Keccak};
use tracing::debug;

/// Module-level state shared by every function of one contract: options,
/// the type cache and the event table. Read-only once built, so functions
/// can be lowered from several threads at once.
#[derive(Debug, Clone)]
pub struct CodeGenModule {
    contract: String,
    options: CodegenOptions,
    types: TypeCache,
    events: Vec<EventDefinition>,
    event_ids: HashMap<String, EventId>,
}

impl CodeGenModule {
    pub fn new(contract: impl Into<String>, options: CodegenOptions) -> Self {
        Self {
            contract: contract.into(),
            options,
            types: TypeCache::new(),
            events: Vec::new(),
            event_ids: HashMap::new(),
        }
    }

    pub fn from_source(unit: &SourceUnit, options: CodegenOptions) -> Result<Self> {
        let mut module = Self::new(unit.contract.clone(), options);
        for event in &unit.events {
            module.register_event(event)?;
        }
        Ok(module)
    }

    /// Adds an event to the table. With overloads, name lookup resolves to
    /// the first registration.
    pub fn register_event(&mut self, decl: &EventDecl) -> Result<EventId> {
        let id = EventId(self.events.len() as u32);
        let parameters = decl
            .params
            .iter()
            .map(|p| {
                Ok(EventParameter {
                    name: p.name.clone(),
                    param_type: self.types.lower_value(&p.ty)?,
                    indexed: p.indexed,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        self.events.push(EventDefinition {
            id,
            name: decl.name.clone(),
            parameters,
            anonymous: decl.anonymous,
        });
        self.event_ids.entry(decl.name.clone()).or_insert(id);
        Ok(id)
    }

    pub fn contract_name(&self) -> &str {
        &self.contract
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeCache {
        &self.types
    }

    pub fn events(&self) -> &[EventDefinition] {
        &self.events
    }

    pub fn event(&self, name: &str) -> Option<&EventDefinition> {
        self.event_ids
            .get(name)
            .and_then(|id| self.events.get(id.0 as usize))
    }

    /// Allocates the target function for `decl` with its signature filled in
    /// and an empty body.
    pub fn declare_function(&self, decl: &FunctionDecl) -> Result<Function> {
        let mut signature = FunctionSignature::new(decl.name.clone());
        for param in &decl.params {
            signature
                .params
                .push(Parameter::new(param.name.clone(), self.types.lower_value(&param.ty)?));
        }
        signature.returns = self.types.lower(&decl.returns)?;

        let mut function = Function::new(signature);
        function.visibility = decl.visibility;
        function.mutability = decl.mutability;
        Ok(function)
    }

    /// First topic of a non-anonymous event: the hash of its signature.
    pub fn event_topic(&self, event: &EventDefinition) -> [u8; 32] {
        let signature = event.signature();
        if self.options.uses_sha256() {
            sha256(signature.as_bytes())
        } else {
            keccak256(signature.as_bytes())
        }
    }

    /// Emits `name(args...)` at the builder's insertion point. Indexed
    /// arguments become topics after the signature hash, the rest is data.
    pub fn emit_event(
        &self,
        builder: &mut FunctionBuilder<'_>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<()> {
        let event = self
            .event(name)
            .ok_or_else(|| CodegenError::UnknownEvent(name.to_string()))?;

        if args.len() != event.parameters.len() {
            return Err(CodegenError::EventArity {
                name: name.to_string(),
                expected: event.parameters.len(),
                got: args.len(),
            });
        }

        let mut topics = Vec::new();
        if !event.anonymous {
            topics.push(Value::Constant(Constant::Bytes(
                self.event_topic(event).to_vec(),
            )));
        }
        let mut data = Vec::new();
        for (param, arg) in event.parameters.iter().zip(args) {
            if param.indexed {
                topics.push(arg);
            } else {
                data.push(arg);
            }
        }

        debug!(target: "codegen", event = %event.signature(), topics = topics.len(), "emit");
        builder.emit_event(event.id, topics, data)?;
        Ok(())
    }

    /// Packs lowered functions and the event table into a contract.
    /// Overloads are kept; two functions with the same canonical signature
    /// are rejected.
    pub fn into_contract(self, functions: Vec<Function>) -> Result<Contract> {
        let mut contract = Contract::new(self.contract);
        contract.events = self.events;
        for function in functions {
            let signature = function.signature.canonical();
            if contract.get_function_by_signature(&signature).is_some() {
                return Err(CodegenError::DuplicateFunction(signature));
            }
            contract.add_function(function);
        }
        Ok(contract)
    }
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut keccak = Keccak::v256();
    let mut output = [0u8; 32];
    keccak.update(data);
    keccak.finalize(&mut output);
    output
}

fn sha256(data: &[u8]) -> [u8; 32] {
    let mut output = [0u8; 32];
    output.copy_from_slice(&Sha256::digest(data));
    output
}
