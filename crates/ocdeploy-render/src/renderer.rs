//! Descriptor rendering — Tera templating followed by YAML parsing.

use std::error::Error as _;
use std::path::Path;

use ocdeploy_core::{DeploymentDescriptor, VariableContext};
use serde_json::Value;
use tera::{Context, Tera};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};

/// Renders deployment templates against a variable context.
///
/// Templates use Tera (Jinja/Twig) syntax. Autoescaping is disabled since
/// the output is YAML, not HTML.
#[derive(Debug, Default, Clone)]
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Render template text to a string. Failures are not retried.
    pub fn render_str(&self, template: &str, variables: &VariableContext) -> RenderResult<String> {
        let context = Context::from_value(variables.to_value())
            .map_err(|e| RenderError::Render(error_chain(&e)))?;
        Tera::one_off(template, &context, false).map_err(|e| RenderError::Render(error_chain(&e)))
    }

    /// Render a template file and parse it into a descriptor.
    pub fn render_file(
        &self,
        path: &Path,
        variables: &VariableContext,
    ) -> RenderResult<DeploymentDescriptor> {
        let template = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rendered = self.render_str(&template, variables)?;
        debug!(path = %path.display(), bytes = rendered.len(), "template rendered");

        let descriptor = parse_descriptor(&rendered)?;
        info!(
            kind = descriptor.kind().unwrap_or("<unset>"),
            "deployment descriptor rendered"
        );
        Ok(descriptor)
    }
}

/// Parse rendered text as exactly one YAML mapping document.
pub fn parse_descriptor(text: &str) -> RenderResult<DeploymentDescriptor> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| RenderError::DescriptorParse(e.to_string()))?;
    DeploymentDescriptor::from_value(value).map_err(|other| {
        RenderError::DescriptorParse(format!(
            "expected a mapping at the document root, found {}",
            value_kind(&other)
        ))
    })
}

/// Read and parse an environment variable file.
pub fn load_variables(path: &Path) -> RenderResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|e| RenderError::VariablesParse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Tera keeps the useful detail in the source chain.
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocdeploy_core::VariableContextBuilder;
    use serde_json::json;

    const TEMPLATE: &str = r#"
apiVersion: v1
kind: DeploymentConfig
metadata:
  name: {{ service }}
spec:
  replicas: {{ replicas }}
  template:
    metadata:
      labels:
        app: {{ service }}
    spec:
      containers:
        - name: app
          image: "registry.example.com/{{ project }}/{{ service }}:{{ image_tag }}"
"#;

    fn context() -> VariableContext {
        let plugin = json!({"project": "shop", "service": "checkout"});
        VariableContextBuilder::new()
            .plugin(plugin.as_object().unwrap().clone())
            .options(json!({"image_tag": "1.4.0"}).as_object().unwrap().clone())
            .environment(Some(json!({"replicas": 3, "image_tag": "latest"})))
            .build()
            .unwrap()
    }

    #[test]
    fn renders_and_parses_descriptor() {
        let rendered = Renderer::new().render_str(TEMPLATE, &context()).unwrap();
        let descriptor = parse_descriptor(&rendered).unwrap();
        let doc = descriptor.as_map();

        assert_eq!(descriptor.kind(), Some("DeploymentConfig"));
        assert_eq!(doc["metadata"]["name"], "checkout");
        assert_eq!(doc["spec"]["replicas"], 3);
        assert_eq!(
            doc["spec"]["template"]["spec"]["containers"][0]["image"],
            "registry.example.com/shop/checkout:1.4.0"
        );
    }

    #[test]
    fn layers_addressable_from_templates() {
        let rendered = Renderer::new()
            .render_str("tag: {{ layers.vars.image_tag }}", &context())
            .unwrap();
        assert_eq!(rendered, "tag: latest");
    }

    #[test]
    fn rundeck_style_template_renders() {
        let plugin = json!({"openshift_project": "shop", "openshift_service": "checkout"});
        let context = VariableContextBuilder::new()
            .plugin(plugin.as_object().unwrap().clone())
            .options(json!({"version": "2.0.1"}).as_object().unwrap().clone())
            .environment(Some(json!({"replicas": 2})))
            .build()
            .unwrap();
        let template = "\
kind: DeploymentConfig
metadata:
  name: {{ rundeck.plugin.openshift_service }}
  namespace: {{ rundeck.plugin.openshift_project }}
spec:
  replicas: {{ vars.replicas }}
  image: \"reg/{{ rundeck.plugin.openshift_service }}:{{ rundeck.option.version }}\"
";
        let rendered = Renderer::new().render_str(template, &context).unwrap();
        let doc = parse_descriptor(&rendered).unwrap().into_map();
        assert_eq!(doc["metadata"]["name"], "checkout");
        assert_eq!(doc["metadata"]["namespace"], "shop");
        assert_eq!(doc["spec"]["replicas"], 2);
        assert_eq!(doc["spec"]["image"], "reg/checkout:2.0.1");
    }

    #[test]
    fn undefined_variable_is_render_error() {
        let err = Renderer::new()
            .render_str("image: {{ nope }}", &context())
            .unwrap_err();
        match err {
            RenderError::Render(msg) => assert!(msg.contains("nope"), "{msg}"),
            other => panic!("expected Render, got {other:?}"),
        }
    }

    #[test]
    fn malformed_template_is_render_error() {
        let err = Renderer::new()
            .render_str("image: {{ service ", &context())
            .unwrap_err();
        assert!(matches!(err, RenderError::Render(_)));
    }

    #[test]
    fn multi_document_output_rejected() {
        let err = parse_descriptor("kind: A\n---\nkind: B\n").unwrap_err();
        assert!(matches!(err, RenderError::DescriptorParse(_)));
    }

    #[test]
    fn non_mapping_root_rejected() {
        let err = parse_descriptor("- a\n- b\n").unwrap_err();
        match err {
            RenderError::DescriptorParse(msg) => assert!(msg.contains("sequence")),
            other => panic!("expected DescriptorParse, got {other:?}"),
        }

        assert!(matches!(
            parse_descriptor(""),
            Err(RenderError::DescriptorParse(_))
        ));
    }

    #[test]
    fn invalid_yaml_rejected() {
        let err = parse_descriptor("spec: [unclosed\n").unwrap_err();
        assert!(matches!(err, RenderError::DescriptorParse(_)));
    }

    #[test]
    fn render_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Deployment.yaml");
        std::fs::write(&path, TEMPLATE).unwrap();

        let descriptor = Renderer::new().render_file(&path, &context()).unwrap();
        assert_eq!(descriptor.as_map()["spec"]["replicas"], 3);

        let missing = Renderer::new().render_file(&dir.path().join("x.yaml"), &context());
        assert!(matches!(missing, Err(RenderError::Io { .. })));
    }

    #[test]
    fn load_variables_parses_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("production.yaml");
        std::fs::write(&path, "replicas: 4\nimage_tag: \"2.0\"\n").unwrap();
        let vars = load_variables(&path).unwrap();
        assert_eq!(vars, json!({"replicas": 4, "image_tag": "2.0"}));

        std::fs::write(&path, "replicas: [4\n").unwrap();
        assert!(matches!(
            load_variables(&path),
            Err(RenderError::VariablesParse { .. })
        ));
    }
}
