use crate::config::EmitterConfig;
use crate::emitter::{Color, EmitContext, EmitHelper, EmitResult, Emitter};
use crate::formatter::IRFormatter;
use anyhow::Result;
use sollir_core::{
    analysis::ControlFlowGraph, BasicBlock, Contract, EventDefinition, Function, Mutability,
    Terminator, Visibility,
};
use std::io::Write;

/// Prints contracts in the textual SOLLIR form.
pub struct SollirEmitter {
    config: EmitterConfig,
}

impl SollirEmitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Renders with the indentation and colours from the config.
    pub fn render(&self, contract: &Contract) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(&self.config);
        self.emit(contract, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn render_function(&self, function: &Function) -> Result<String> {
        let mut buffer = Vec::new();
        let mut context = EmitContext::from_config(&self.config);
        self.emit_function(function, &mut buffer, &mut context)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn emit_event<W: Write>(
        &self,
        event: &EventDefinition,
        writer: &mut W,
        context: &EmitContext,
    ) -> EmitResult {
        let params = event
            .parameters
            .iter()
            .map(|p| {
                if p.indexed {
                    format!("{} indexed", p.param_type)
                } else {
                    p.param_type.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let anonymous = if event.anonymous { " anonymous" } else { "" };
        EmitHelper::write_line(
            writer,
            context,
            &format!("{} {}({}){}", event.id, event.name, params, anonymous),
        )
    }

    pub fn emit_function<W: Write>(
        &self,
        function: &Function,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        EmitHelper::write_colored_line(writer, context, &function_header(function), Color::Header)?;
        context.indent();

        if self.config.include_types {
            for (index, param) in function.signature.params.iter().enumerate() {
                EmitHelper::write_comment(
                    writer,
                    context,
                    &format!("p{} {}: {}", index, param.name, param.param_type),
                )?;
            }
            for local in &function.body.locals {
                EmitHelper::write_comment(
                    writer,
                    context,
                    &format!(
                        "{} {}: {}",
                        local.id,
                        local.name,
                        IRFormatter::format_type(&local.var_type)
                    ),
                )?;
            }
        }

        let cfg = self
            .config
            .verbosity
            .should_print_predecessors()
            .then(|| ControlFlowGraph::from_function(&function.body));

        for block in function.body.blocks.values() {
            if !block.metadata.is_reachable && !self.config.show_unreachable {
                continue;
            }
            let preds = cfg.as_ref().map(|cfg| {
                cfg.predecessors(block.id)
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            });
            self.emit_block(block, preds, writer, context)?;
        }

        context.dedent();
        EmitHelper::write_line(writer, context, "}")
    }

    fn emit_block<W: Write>(
        &self,
        block: &BasicBlock,
        preds: Option<String>,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let mut header = if self.config.verbosity.should_print_labels() {
            IRFormatter::format_block_ref(block.id, &block.label)
        } else {
            format!("{}:", block.id)
        };
        if !block.metadata.is_reachable {
            header.push_str(" (unreachable)");
        }
        if let Some(preds) = preds {
            header.push_str(&format!(" preds: [{}]", preds));
        }
        EmitHelper::write_colored_line(writer, context, &header, Color::Block)?;

        context.indent();
        for inst in &block.instructions {
            EmitHelper::write_line(writer, context, &IRFormatter::format_instruction(inst))?;
        }
        let term = IRFormatter::format_terminator(&block.terminator);
        match block.terminator {
            Terminator::Revert(_) | Terminator::Panic => {
                EmitHelper::write_colored_line(writer, context, &term, Color::Abort)?
            }
            _ => EmitHelper::write_line(writer, context, &term)?,
        }
        context.dedent();
        Ok(())
    }
}

impl Default for SollirEmitter {
    fn default() -> Self {
        Self::new(EmitterConfig::default())
    }
}

impl Emitter for SollirEmitter {
    type Item = Contract;

    fn emit<W: Write>(
        &self,
        contract: &Contract,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        EmitHelper::write_colored_line(
            writer,
            context,
            &format!("contract {} {{", contract.name),
            Color::Header,
        )?;
        context.indent();

        if self.config.verbosity.should_print_events() {
            for event in &contract.events {
                self.emit_event(event, writer, context)?;
            }
        }

        for function in contract.functions.values() {
            writeln!(writer)?;
            self.emit_function(function, writer, context)?;
        }

        context.dedent();
        EmitHelper::write_line(writer, context, "}")
    }
}

fn function_header(function: &Function) -> String {
    let params = function
        .signature
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| format!("p{}: {}", i, IRFormatter::format_type(&p.param_type)))
        .collect::<Vec<_>>()
        .join(", ");

    let returns = function
        .signature
        .returns
        .as_ref()
        .map(|t| format!(" -> {}", IRFormatter::format_type(t)))
        .unwrap_or_default();

    let visibility = match function.visibility {
        Visibility::Public => "public",
        Visibility::External => "external",
        Visibility::Internal => "internal",
        Visibility::Private => "private",
    };

    let mutability = match function.mutability {
        Mutability::Pure => " pure",
        Mutability::View => " view",
        Mutability::Payable => " payable",
        Mutability::NonPayable => "",
    };

    format!(
        "function %{}({}){} {}{} {{",
        function.name(),
        params,
        returns,
        visibility,
        mutability
    )
}
