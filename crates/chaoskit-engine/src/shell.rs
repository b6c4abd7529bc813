//! Config-driven shell executor
//!
//! Applies a fault by running its `create` template and reverses it by
//! running its `destroy` template. `{flag}` placeholders are filled from the
//! model's action flags, shell-quoted. Shell expansions such as
//! `${CHAOSKIT_UID}` are passed through untouched.

use chaoskit_spec::{
    Channel, ExpContext, ExpModel, Executor, FlagSpec, LocalChannel, Response,
};
use std::sync::Arc;

/// Executor running templated shell commands through its channel
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    name: String,
    create: String,
    destroy: String,
    flags: Vec<FlagSpec>,
    channel: Option<Arc<dyn Channel>>,
}

impl ShellExecutor {
    /// Executor with no channel bound
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        create: impl Into<String>,
        destroy: impl Into<String>,
        flags: Vec<FlagSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            create: create.into(),
            destroy: destroy.into(),
            flags,
            channel: None,
        }
    }

    /// Bind the local channel
    #[must_use]
    pub fn local(mut self) -> Self {
        self.channel = Some(Arc::new(LocalChannel::new()));
        self
    }

    fn check_required(&self, model: &ExpModel, destroy: bool) -> Result<(), Response> {
        for flag in &self.flags {
            let required = if destroy {
                flag.required_when_destroyed
            } else {
                flag.required
            };
            let present = model
                .action_flags
                .get(&flag.name)
                .is_some_and(|v| !v.is_empty());
            if required && !present {
                return Err(Response::parameter_less(&flag.name));
            }
        }
        Ok(())
    }
}

/// Fill `{name}` placeholders of `template` from `model`'s flags.
///
/// Braces not enclosing a flag-like name, and `${...}` expansions, are
/// copied literally.
pub fn render(template: &str, model: &ExpModel) -> Result<String, Response> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        if out.ends_with('$') {
            let end = after.find('}').map_or(after.len(), |close| close + 1);
            out.push('{');
            out.push_str(&after[..end]);
            rest = &after[end..];
            continue;
        }
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(after.len());
        if name_len > 0 && after[name_len..].starts_with('}') {
            let name = &after[..name_len];
            let value = model
                .action_flags
                .get(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Response::parameter_less(name))?;
            out.push_str(&shell_quote(value));
            rest = &after[name_len + 1..];
        } else {
            out.push('{');
            rest = after;
        }
    }
    out.push_str(rest);
    Ok(out)
}

fn shell_quote(value: &str) -> String {
    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@%+".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[async_trait::async_trait]
impl Executor for ShellExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_channel(&mut self, channel: Arc<dyn Channel>) {
        self.channel = Some(channel);
    }

    async fn exec(&self, uid: &str, ctx: &ExpContext, model: &ExpModel) -> Response {
        let Some(channel) = &self.channel else {
            return Response::channel_not_found(&self.name);
        };
        let destroy = ctx.is_destroy();
        if let Err(resp) = self.check_required(model, destroy) {
            return resp;
        }
        let template = if destroy { &self.destroy } else { &self.create };
        let script = match render(template, model) {
            Ok(script) => script,
            Err(resp) => return resp,
        };
        tracing::info!(
            executor = %self.name,
            uid,
            destroy,
            channel = channel.name(),
            "running experiment command"
        );
        channel.run(ctx, &script).await
    }
}
