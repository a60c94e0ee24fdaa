//! Built-in directives.
//!
//! A small set of control-flow directives, inline `php` blocks, and
//! `extends`, which defers the parent layout render to the footer.

use crate::context::TranspileContext;
use crate::directive::{strip_parentheses, DirectiveRegistry};
use crate::error::{TranspileError, TranspileResult};

pub(crate) fn register_builtins(registry: &mut DirectiveRegistry) {
    registry.register("if", |_, arg| {
        Ok(format!("<?php if{}: ?>", required("if", arg)?))
    });
    registry.register("elseif", |_, arg| {
        Ok(format!("<?php elseif{}: ?>", required("elseif", arg)?))
    });
    registry.register("else", |_, _| Ok("<?php else: ?>".to_string()));
    registry.register("endif", |_, _| Ok("<?php endif; ?>".to_string()));

    registry.register("unless", |_, arg| {
        Ok(format!("<?php if (! {}): ?>", required("unless", arg)?))
    });
    registry.register("endunless", |_, _| Ok("<?php endif; ?>".to_string()));

    registry.register("foreach", |_, arg| {
        Ok(format!("<?php foreach{}: ?>", required("foreach", arg)?))
    });
    registry.register("endforeach", |_, _| {
        Ok("<?php endforeach; ?>".to_string())
    });

    registry.register("php", |_, arg| match arg {
        Some(expression) => Ok(format!("<?php {}; ?>", strip_parentheses(expression))),
        None => Ok("<?php".to_string()),
    });
    registry.register("endphp", |_, _| Ok("?>".to_string()));

    registry.register("extends", transpile_extends);
}

fn transpile_extends(ctx: &mut TranspileContext<'_>, arg: Option<&str>) -> TranspileResult<String> {
    let view = strip_parentheses(required("extends", arg)?);
    ctx.push_footer(format!(
        "<?php echo $__env->make({}, get_defined_vars())->render(); ?>",
        view
    ));
    Ok(String::new())
}

fn required<'a>(directive: &str, arg: Option<&'a str>) -> TranspileResult<&'a str> {
    match arg {
        Some(expression) if !strip_parentheses(expression).trim().is_empty() => Ok(expression),
        _ => Err(TranspileError::handler(
            directive,
            "an expression argument is required",
        )),
    }
}
