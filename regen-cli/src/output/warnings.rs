//! Text rendering of breaking-change warnings.
//!
//! Every warning renders to a single line:
//!
//! ```text
//! warning: in 'Query' function 'name' has changed return type from 'string' to 'string?'. This can break existing clients.
//! ```

use colored::Colorize;
use regen_core::{Warning, WarningKind};

const SUFFIX: &str = "This can break existing clients.";

/// Noun used for the member a warning concerns.
fn member_noun(kind: WarningKind) -> &'static str {
    match kind {
        WarningKind::MemberRemoved => "member",
        WarningKind::FieldTypeChanged
        | WarningKind::FieldDefaultRemoved
        | WarningKind::FieldAddedNoDefault => "field",
        WarningKind::UnionMemberRemoved => "union member",
        WarningKind::EnumMemberRemoved => "enum member",
        WarningKind::ParameterRemoved
        | WarningKind::ParameterTypeChanged
        | WarningKind::ParameterAddedNoDefault
        | WarningKind::ParameterDefaultRemoved => "parameter",
        WarningKind::ReturnTypeChanged
        | WarningKind::ResolverCategoryInterchanged
        | WarningKind::QualifierListChanged => "function",
        WarningKind::ResolverRemoved => "resolver",
    }
}

/// Kind-specific part of the message, after the member name.
pub fn warning_detail(warning: &Warning) -> String {
    let first = warning.value(0).unwrap_or_default();
    let second = warning.value(1).unwrap_or_default();

    match warning.kind {
        WarningKind::MemberRemoved
        | WarningKind::UnionMemberRemoved
        | WarningKind::EnumMemberRemoved
        | WarningKind::ParameterRemoved
        | WarningKind::ResolverRemoved => "has been removed".to_string(),
        WarningKind::FieldTypeChanged | WarningKind::ParameterTypeChanged => {
            format!("has changed type from '{}' to '{}'", first, second)
        }
        WarningKind::FieldDefaultRemoved | WarningKind::ParameterDefaultRemoved => {
            format!("has lost its default value '{}'", first)
        }
        WarningKind::FieldAddedNoDefault | WarningKind::ParameterAddedNoDefault => {
            format!("of type '{}' has been added without a default value", first)
        }
        WarningKind::ReturnTypeChanged => {
            format!("has changed return type from '{}' to '{}'", first, second)
        }
        WarningKind::ResolverCategoryInterchanged => {
            format!("has changed from a '{}' to a '{}' function", first, second)
        }
        WarningKind::QualifierListChanged => {
            format!("has changed qualifiers from '{}' to '{}'", first, second)
        }
    }
}

/// Render one warning as a plain text line.
pub fn render_warning(warning: &Warning) -> String {
    format!(
        "warning: in '{}' {} '{}' {}. {}",
        warning.container,
        member_noun(warning.kind),
        warning.member,
        warning_detail(warning),
        SUFFIX
    )
}

/// Render all warnings, one per line, optionally colored.
pub fn render_warnings(warnings: &[Warning], color: bool) -> String {
    warnings
        .iter()
        .map(|warning| {
            if color {
                format!(
                    "{} in '{}' {} '{}' {}. {}",
                    "warning:".yellow().bold(),
                    warning.container.cyan(),
                    member_noun(warning.kind),
                    warning.member.bold(),
                    warning_detail(warning),
                    SUFFIX.dimmed()
                )
            } else {
                render_warning(warning)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
