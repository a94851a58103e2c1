use crate::config::CompilerConfig;
use flex_syntax::{Expr, SyntaxKind};

/// Label for a syntax kind; kinds without a template use their kind name.
pub fn label_for(kind: &SyntaxKind, config: &CompilerConfig) -> String {
    template(kind, config.max_snippet_chars)
        .filter(|label| !label.trim().is_empty())
        .unwrap_or_else(|| fallback(kind))
}

fn fallback(kind: &SyntaxKind) -> String {
    let name = kind.name().trim();
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name.to_string()
    }
}

fn template(kind: &SyntaxKind, max: usize) -> Option<String> {
    let quote = |expr: &Expr| snippet(&expr.text, max);

    let label = match kind {
        SyntaxKind::FunctionDef { name, is_async } => {
            let prefix = if *is_async { "Async Function" } else { "Function" };
            format!("{prefix}: {name}")
        }
        SyntaxKind::ClassDef { name } => format!("Class: {name}"),
        SyntaxKind::For { target, iter } => {
            format!("For Loop over {} in {}", quote(target), quote(iter))
        }
        SyntaxKind::While { test } => format!("While Loop: {}", quote(test)),
        SyntaxKind::If { test } => format!("If Condition: {}", quote(test)),
        SyntaxKind::With { items } => format!("With: {}", snippet(items, max)),
        SyntaxKind::Assign { targets, value } => {
            let targets = targets.iter().map(quote).collect::<Vec<_>>().join(" = ");
            match value {
                Some(value) => format!("Assignment: {targets} = {}", quote(value)),
                None => format!("Assignment: {targets}"),
            }
        }
        SyntaxKind::AugAssign { target, op, value } => {
            format!("Assignment: {} {op} {}", quote(target), quote(value))
        }
        SyntaxKind::Return { value: Some(value) } => format!("Return: {}", quote(value)),
        SyntaxKind::Return { value: None } => "Return".to_string(),
        SyntaxKind::Call { callee } => format!("Call: {}", snippet(callee, max)),
        SyntaxKind::Compare {
            operands,
            operators,
        } => {
            let mut text = String::new();
            for (idx, operand) in operands.iter().enumerate() {
                if idx > 0 {
                    let op = operators.get(idx - 1).map(String::as_str).unwrap_or("?");
                    text.push_str(&format!(" {op} "));
                }
                text.push_str(&operand.text);
            }
            format!("Comparison: {}", snippet(&text, max))
        }
        SyntaxKind::Try => "Try Block".to_string(),
        SyntaxKind::ExceptHandler {
            exception: Some(exception),
        } => format!("Except: {}", snippet(exception, max)),
        SyntaxKind::ExceptHandler { exception: None } => "Except: any exception".to_string(),
        SyntaxKind::Comprehension { flavor } => format!("{} Comprehension", flavor.as_str()),
        SyntaxKind::Lambda => "Lambda Function".to_string(),
        SyntaxKind::Import { text } => snippet(text, max),
        SyntaxKind::Raise {
            exception: Some(exception),
        } => format!("Raise: {}", snippet(exception, max)),
        SyntaxKind::Raise { exception: None } => "Raise".to_string(),
        SyntaxKind::Expr { value } => format!("Expression: {}", quote(value)),
        SyntaxKind::Module | SyntaxKind::Pass | SyntaxKind::Other { .. } => return None,
    };

    Some(label)
}

/// Truncate to `max` characters with an ellipsis (0 = unlimited)
fn snippet(text: &str, max: usize) -> String {
    if max == 0 || text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}
