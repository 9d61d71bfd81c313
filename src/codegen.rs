//! Mapping-function emission, step two: render each compiled mapping as a
//! compilable Rust source fragment for the host build to merge into the
//! owning type's module. Output is a pure function of the artifact, so
//! repeated builds produce byte-identical fragments.

use crate::emit::{FieldOp, FieldStep, MappingArtifact};
use crate::markers::Direction;

/// Indent-aware line writer.
pub struct SourceBuilder {
    out: String,
    indent: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        SourceBuilder { out: String::new(), indent: 0 }
    }

    pub fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Open a brace block; `head` should end with a space.
    pub fn open(&mut self, head: &str) {
        self.line(&format!("{head}{{"));
        self.indent += 1;
    }

    pub fn close(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

impl Default for SourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the fragment for one marked type: the optional carrier struct, the
/// optional factory trait, and the mapping function body.
pub fn render_fragment(artifact: &MappingArtifact) -> String {
    let mut sb = SourceBuilder::new();
    let owner = &artifact.spec.owner.name;
    let counterpart = &artifact.spec.counterpart.name;

    sb.line(&format!("// Mapping support for `{owner}`, generated by shapemap. Do not edit."));
    sb.blank();

    if let (Some(carrier), Some(hook)) = (&artifact.carrier, &artifact.hook) {
        let dest = &artifact.spec.constructed_shape().name;
        let source = &artifact.spec.source_shape().name;
        sb.line(&format!("/// Properties that `{dest}` requires but `{source}` does not supply."));
        sb.open(&format!("pub struct {} ", carrier.name));
        for field in &carrier.fields {
            if let Some(loc) = &field.location {
                sb.line(&format!("/// Declared at {loc}."));
            }
            sb.line(&format!("pub {}: {},", field.name, field.ty));
        }
        sb.close();
        sb.blank();

        sb.line(&format!("/// Required factory: `{owner}` must produce the carrier itself."));
        sb.open(&format!("pub trait {} ", hook.trait_name));
        sb.line(&format!(
            "fn {}(mapper: &Mapper, source: &{}) -> {};",
            hook.fn_name, hook.source_shape, hook.carrier
        ));
        sb.close();
        sb.blank();
    }

    sb.open(&format!("impl {owner} "));
    match artifact.spec.direction {
        Direction::FromCounterpart => {
            sb.line("/// Builds an instance from its counterpart shape.");
            sb.open(&format!("pub fn build_from(mapper: &Mapper, source: &{counterpart}) -> Self "));
            if let Some(hook) = &artifact.hook {
                sb.line(&format!(
                    "let unmapped = <Self as {}>::{}(mapper, source);",
                    hook.trait_name, hook.fn_name
                ));
            }
            sb.open("Self ");
            for step in &artifact.steps {
                sb.line(&render_step(step, "source"));
            }
            sb.close();
            sb.close();
        }
        Direction::IntoCounterpart => {
            sb.line("/// Converts this instance into its counterpart shape.");
            sb.open(&format!("pub fn convert_to(&self, mapper: &Mapper) -> {counterpart} "));
            if let Some(hook) = &artifact.hook {
                sb.line(&format!(
                    "let unmapped = <Self as {}>::{}(mapper, self);",
                    hook.trait_name, hook.fn_name
                ));
            }
            sb.open(&format!("{counterpart} "));
            for step in &artifact.steps {
                sb.line(&render_step(step, "self"));
            }
            sb.close();
            sb.close();
        }
    }
    sb.close();

    sb.into_string()
}

fn render_step(step: &FieldStep, source: &str) -> String {
    let dest = &step.dest;
    match &step.op {
        FieldOp::Copy => format!("{dest}: {source}.{dest}.clone(),"),
        FieldOp::Convert { .. } => format!("{dest}: mapper.convert(&{source}.{dest}),"),
        FieldOp::FromCarrier => format!("{dest}: unmapped.{dest},"),
    }
}

/// All fragments, separated by a blank line, in artifact order.
pub fn render_all(artifacts: &[MappingArtifact]) -> String {
    artifacts.iter().map(render_fragment).collect::<Vec<_>>().join("\n")
}

// ------------------------------- Tests ------------------------------------ //
