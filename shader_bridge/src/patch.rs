//! Textual patches applied to emitted source
//!
//! The transpiler cannot express everything the target runtime needs (flat
//! uniforms without their struct, the legacy fragment color on ES), so the
//! emitted text is patched. Patches live in a table: each rule has a scope
//! (which profiles and stages it applies to) and an action. Templates in the
//! action expand `{marker}`, `{struct}` and `{output}` from the PatchContext.

use bitflags::bitflags;
use crate::config::TargetProfile;
use crate::shader::ShaderStage;

bitflags! {
    /// Profiles and stages a patch applies to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PatchScope: u32 {
        const DESKTOP = 1 << 0;
        const MOBILE = 1 << 1;
        const VERTEX = 1 << 2;
        const FRAGMENT = 1 << 3;

        const ALL_PROFILES = Self::DESKTOP.bits() | Self::MOBILE.bits();
        const ALL_STAGES = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

impl PatchScope {
    fn profile(profile: TargetProfile) -> Self {
        match profile {
            TargetProfile::Desktop => PatchScope::DESKTOP,
            TargetProfile::Mobile => PatchScope::MOBILE,
        }
    }

    fn stage(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => PatchScope::VERTEX,
            ShaderStage::Fragment => PatchScope::FRAGMENT,
        }
    }

    /// Whether this scope covers the given profile and stage
    pub fn covers(self, profile: TargetProfile, stage: ShaderStage) -> bool {
        self.contains(Self::profile(profile) | Self::stage(stage))
    }
}

/// What a patch does to the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    /// Prefix the first occurrence with `//`
    CommentOut(&'static str),
    /// Delete every occurrence
    RemoveAll(&'static str),
    /// Drop the first line if it starts with the prefix
    StripLeadingLine(&'static str),
    /// Drop every line declaring `name` with the given storage qualifier
    RemoveDeclarationLine {
        qualifier: &'static str,
        name: &'static str,
    },
    /// Rename every whole-identifier occurrence
    ReplaceIdentifier {
        from: &'static str,
        to: &'static str,
    },
}

/// A patch rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPatch {
    pub name: &'static str,
    pub scope: PatchScope,
    pub action: PatchAction,
}

/// Patch rules, in application order
pub static PATCHES: &[TextPatch] = &[
    TextPatch {
        name: "comment-unused-instance",
        scope: PatchScope::ALL_PROFILES.union(PatchScope::ALL_STAGES),
        action: PatchAction::CommentOut("uniform {struct} {marker}"),
    },
    TextPatch {
        name: "strip-unused-accessor",
        scope: PatchScope::ALL_PROFILES.union(PatchScope::ALL_STAGES),
        action: PatchAction::RemoveAll("{marker}."),
    },
    TextPatch {
        name: "strip-version-line",
        scope: PatchScope::MOBILE.union(PatchScope::ALL_STAGES),
        action: PatchAction::StripLeadingLine("#version"),
    },
    TextPatch {
        name: "remove-fragment-output",
        scope: PatchScope::MOBILE.union(PatchScope::FRAGMENT),
        action: PatchAction::RemoveDeclarationLine { qualifier: "out", name: "{output}" },
    },
    TextPatch {
        name: "legacy-fragment-color",
        scope: PatchScope::MOBILE.union(PatchScope::FRAGMENT),
        action: PatchAction::ReplaceIdentifier { from: "{output}", to: "gl_FragColor" },
    },
];

/// Values substituted into patch templates
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub stage: ShaderStage,
    pub profile: TargetProfile,
    /// Renamed uniform-buffer instance
    pub marker: &'a str,
    /// Struct type name of the uniform buffer
    pub struct_name: &'a str,
    /// Declared fragment output, if any
    pub output: Option<&'a str>,
}

impl PatchContext<'_> {
    /// Expand a template; `None` when it needs a value the stage does not have
    fn expand(&self, template: &str) -> Option<String> {
        let mut text = template
            .replace("{marker}", self.marker)
            .replace("{struct}", self.struct_name);
        if text.contains("{output}") {
            text = text.replace("{output}", self.output?);
        }
        Some(text)
    }
}

/// Apply every rule of `PATCHES` in scope for the context
pub fn apply_patches(source: &str, context: &PatchContext<'_>) -> String {
    apply_patch_table(source, context, PATCHES)
}

/// Apply the rules of an arbitrary table in scope for the context
pub fn apply_patch_table(source: &str, context: &PatchContext<'_>, table: &[TextPatch]) -> String {
    let mut text = source.to_string();
    for patch in table {
        if !patch.scope.covers(context.profile, context.stage) {
            continue;
        }
        match apply_action(&text, &patch.action, context) {
            Some(patched) => {
                crate::bridge_trace!(
                    "shader_bridge::patch",
                    "Applied '{}' ({} stage)",
                    patch.name,
                    context.stage
                );
                text = patched;
            }
            None => {
                crate::bridge_trace!(
                    "shader_bridge::patch",
                    "Skipped '{}' ({} stage)",
                    patch.name,
                    context.stage
                );
            }
        }
    }
    text
}

fn apply_action(text: &str, action: &PatchAction, context: &PatchContext<'_>) -> Option<String> {
    match *action {
        PatchAction::CommentOut(template) => {
            let target = context.expand(template)?;
            let pos = text.find(&target)?;
            let mut patched = String::with_capacity(text.len() + 2);
            patched.push_str(&text[..pos]);
            patched.push_str("//");
            patched.push_str(&text[pos..]);
            Some(patched)
        }
        PatchAction::RemoveAll(template) => {
            let target = context.expand(template)?;
            Some(text.replace(&target, ""))
        }
        PatchAction::StripLeadingLine(prefix) => {
            if !text.starts_with(prefix) {
                return None;
            }
            Some(text.find('\n').map_or_else(String::new, |end| text[end + 1..].to_string()))
        }
        PatchAction::RemoveDeclarationLine { qualifier, name } => {
            let name = context.expand(name)?;
            let declared = format!("{};", name);
            let kept: Vec<&str> = text
                .split_inclusive('\n')
                .filter(|line| {
                    let mut tokens = line.split_whitespace();
                    let has_qualifier = tokens.clone().any(|t| t == qualifier);
                    !(has_qualifier && tokens.next_back() == Some(declared.as_str()))
                })
                .collect();
            Some(kept.concat())
        }
        PatchAction::ReplaceIdentifier { from, to } => {
            let from = context.expand(from)?;
            Some(replace_identifier(text, &from, to))
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace `from` wherever it appears as a whole identifier
pub fn replace_identifier(text: &str, from: &str, to: &str) -> String {
    if from.is_empty() {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(from) {
        let before = rest[..pos].chars().next_back();
        let after = rest[pos + from.len()..].chars().next();
        let whole = !before.is_some_and(is_identifier_char) && !after.is_some_and(is_identifier_char);

        result.push_str(&rest[..pos]);
        result.push_str(if whole { to } else { from });
        rest = &rest[pos + from.len()..];
    }
    result.push_str(rest);
    result
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
