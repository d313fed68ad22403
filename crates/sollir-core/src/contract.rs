use crate::function::Function;
use crate::types::Type;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub name: String,
    pub functions: IndexMap<String, Function>,
    pub events: Vec<EventDefinition>,
}

impl Contract {
    pub fn new(name: String) -> Self {
        Self {
            name,
            functions: IndexMap::new(),
            events: Vec::new(),
        }
    }

    /// Functions are keyed by canonical signature, so overloads sharing a
    /// name are kept side by side.
    pub fn add_function(&mut self, function: Function) {
        self.functions
            .insert(function.signature.canonical(), function);
    }

    /// First function called `name`, in insertion order.
    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.values().find(|f| f.name() == name)
    }

    /// Exact lookup by `name(type,...)`.
    pub fn get_function_by_signature(&self, signature: &str) -> Option<&Function> {
        self.functions.get(signature)
    }

    pub fn overloads<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Function> + 'a {
        self.functions.values().filter(move |f| f.name() == name)
    }

    pub fn event(&self, id: EventId) -> Option<&EventDefinition> {
        self.events.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: EventId,
    pub name: String,
    pub parameters: Vec<EventParameter>,
    pub anonymous: bool,
}

impl EventDefinition {
    /// `Name(type,...)`, the preimage of the event's first topic.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| p.param_type.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.name, params)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "event{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventParameter {
    pub name: String,
    pub param_type: Type,
    pub indexed: bool,
}
