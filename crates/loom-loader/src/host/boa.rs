//! Headless host on the embedded boa engine.
//!
//! Capabilities are stand-ins that render as `{ type, props, children }`
//! nodes named after the capability, so a lesson can be previewed and checked
//! without a browser.

use boa_engine::builtins::promise::PromiseState;
use boa_engine::property::PropertyKey;
use boa_engine::{Context, JsError, JsString, JsValue, Module, Source};

use super::{ModuleBlob, ModuleHost};
use crate::error::LoadError;
use crate::wrapper::CAPABILITIES_GLOBAL;

const RUNTIME_JS: &str = include_str!("runtime.js");

/// Global slot the component is parked in while it renders.
const COMPONENT_SLOT: &str = "__loom_component__";

pub struct BoaHost {
    context: Context,
}

impl std::fmt::Debug for BoaHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoaHost").finish_non_exhaustive()
    }
}

impl BoaHost {
    /// Create a realm with the headless runtime and every registered
    /// capability installed.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Host`] if the runtime script fails to evaluate.
    pub fn new() -> Result<Self, LoadError> {
        let mut context = Context::default();
        context
            .eval(Source::from_bytes(RUNTIME_JS))
            .map_err(|e| LoadError::Host(e.to_string()))?;

        let names: Vec<&str> = loom_registry::names().collect();
        let names = serde_json::to_string(&names).map_err(|e| LoadError::Host(e.to_string()))?;
        let install =
            format!("globalThis.{CAPABILITIES_GLOBAL} = __loom_install_capabilities__({names});");
        context
            .eval(Source::from_bytes(install.as_bytes()))
            .map_err(|e| LoadError::Host(e.to_string()))?;

        Ok(Self { context })
    }

    fn describe(&mut self, err: &JsError) -> String {
        err.try_native(&mut self.context)
            .map_or_else(|_| err.to_string(), |native| native.to_string())
    }

    fn host_error(&mut self, err: &JsError) -> LoadError {
        LoadError::Host(self.describe(err))
    }
}

impl ModuleHost for BoaHost {
    type Module = Module;
    type Component = JsValue;

    fn import(&mut self, blob: &ModuleBlob) -> Result<Module, LoadError> {
        tracing::debug!(specifier = blob.specifier(), "importing module");
        let module = Module::parse(Source::from_bytes(blob.source()), None, &mut self.context)
            .map_err(|e| LoadError::Evaluation(self.describe(&e)))?;

        let promise = module.load_link_evaluate(&mut self.context);
        self.context.run_jobs();

        match promise.state() {
            PromiseState::Fulfilled(_) => Ok(module),
            PromiseState::Rejected(reason) => {
                let err = JsError::from_opaque(reason);
                Err(LoadError::Evaluation(self.describe(&err)))
            }
            PromiseState::Pending => Err(LoadError::Evaluation(String::from(
                "module evaluation did not settle",
            ))),
        }
    }

    fn export_names(&mut self, module: &Module) -> Result<Vec<String>, LoadError> {
        let namespace = module.namespace(&mut self.context);
        let keys = namespace
            .own_property_keys(&mut self.context)
            .map_err(|e| self.host_error(&e))?;

        let mut found = Vec::new();
        for key in keys {
            let PropertyKey::String(name) = &key else {
                continue;
            };
            let value = namespace
                .get(key.clone(), &mut self.context)
                .map_err(|e| self.host_error(&e))?;
            if !value.is_undefined() {
                found.push(name.to_std_string_escaped());
            }
        }
        Ok(found)
    }

    fn component(&mut self, module: &Module, name: &str) -> Result<Option<JsValue>, LoadError> {
        let namespace = module.namespace(&mut self.context);
        let value = namespace
            .get(JsString::from(name), &mut self.context)
            .map_err(|e| self.host_error(&e))?;
        Ok(value.is_callable().then_some(value))
    }

    fn render(&mut self, component: &JsValue) -> Result<serde_json::Value, LoadError> {
        let global = self.context.global_object();
        global
            .set(
                JsString::from(COMPONENT_SLOT),
                component.clone(),
                false,
                &mut self.context,
            )
            .map_err(|e| self.host_error(&e))?;

        let rendered = self
            .context
            .eval(Source::from_bytes("__loom_render__(__loom_component__)"))
            .map_err(|e| LoadError::Invocation(self.describe(&e)));

        global
            .delete_property_or_throw(JsString::from(COMPONENT_SLOT), &mut self.context)
            .map_err(|e| self.host_error(&e))?;

        let rendered = rendered?;
        let json = rendered
            .as_string()
            .map(|s| s.to_std_string_escaped())
            .ok_or_else(|| LoadError::Invocation(String::from("component rendered nothing")))?;
        serde_json::from_str(&json).map_err(|e| LoadError::Host(e.to_string()))
    }
}
