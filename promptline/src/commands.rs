use std::io::Read;
use std::path::Path;

use anyhow::Context;
use promptline_config::Config;
use promptline_inference::code_interpreter::substitute_code_interpreter;
use promptline_inference::template::builtin;
use promptline_inference::{
    GenerationRequest, ResolvedTemplate, TemplateRegistry, parse_response, render_text, resolve_tool_choice,
};

use crate::args::{Command, TemplateArgs};

/// Execute a subcommand and return what it prints
pub fn run(config: &Config, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Render { request, template } => {
            let template = select_template(config, &template)?;
            let request: GenerationRequest = serde_json::from_str(&read_input(&request)?)
                .with_context(|| format!("invalid request in {}", request.display()))?;

            render(&template, &request)
        }
        Command::StopMarkers { stop, template } => {
            let template = select_template(config, &template)?;
            stop_markers(config, &template, &stop)
        }
        Command::Parse { text, template } => {
            let template = select_template(config, &template)?;
            let message = parse_response(template.template.as_ref(), &read_input(&text)?)?;

            Ok(serde_json::to_string_pretty(&message)?)
        }
    }
}

fn render(template: &ResolvedTemplate, request: &GenerationRequest) -> anyhow::Result<String> {
    let tools = resolve_tool_choice(
        substitute_code_interpreter(request.declared_tools()),
        request.tool_choice.as_ref(),
    )?;

    Ok(render_text(template.template.as_ref(), &request.messages, &tools.tools, &tools.forcing))
}

fn stop_markers(config: &Config, template: &ResolvedTemplate, extra: &[String]) -> anyhow::Result<String> {
    let markers = config
        .inference
        .stop
        .iter()
        .chain(extra)
        .map(String::as_str)
        .chain(template.template.stop_markers_for_generation().iter().copied())
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(markers.join("\n"))
}

fn select_template(config: &Config, args: &TemplateArgs) -> anyhow::Result<ResolvedTemplate> {
    if let Some(family) = args.family {
        return Ok(ResolvedTemplate {
            template: builtin(family),
            correction: None,
        });
    }

    let model = args
        .model
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("either --model or --family is required"))?;

    let registry = TemplateRegistry::from_rules(&config.templates)?;
    let resolved = registry.resolve_model_id(model)?;

    tracing::debug!(model, template = resolved.template.name(), "template selected");

    Ok(resolved)
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut input = String::new();
        std::io::stdin().read_to_string(&mut input).context("failed to read stdin")?;
        return Ok(input);
    }

    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
