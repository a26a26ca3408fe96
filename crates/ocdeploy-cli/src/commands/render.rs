use std::path::Path;

use anyhow::bail;
use ocdeploy_release::prepare_descriptor;
use ocdeploy_render::Renderer;

use super::Request;

pub fn run(request: Request, checkout: &Path, format: &str) -> anyhow::Result<()> {
    let (config, options) = request.load()?;
    let descriptor = prepare_descriptor(&config, checkout, &options, &Renderer::new())?;

    let output = match format {
        "yaml" => serde_yaml::to_string(&descriptor)?,
        "json" => serde_json::to_string_pretty(&descriptor)? + "\n",
        other => bail!("unknown output format `{other}` (expected yaml or json)"),
    };
    print!("{output}");
    Ok(())
}
