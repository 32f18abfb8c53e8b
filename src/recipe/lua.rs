//! Lua recipe evaluation.
//!
//! A recipe file is a Lua chunk returning a table:
//!
//! ```lua
//! local recipe = {
//!   name = "libfoo",
//!   version = "1.0.0",
//!   requires = { "libbar/2.0@foundry/stable" },
//! }
//!
//! function recipe:requirements()
//!   if self.profile ~= "minimal" then
//!     self:requires("zlib/1.2.13@" .. self.user .. "/" .. self.channel)
//!   end
//! end
//!
//! return recipe
//! ```
//!
//! Each evaluation runs in a brand new Lua state with only the `table`,
//! `string`, `math` and `utf8` libraries. There is no `io`, `os`,
//! `package` or `debug`, and the file-loading base functions are removed.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use mlua::{Function, Lua, LuaOptions, StdLib, Table, Value, Variadic};
use tracing::{debug, info};

use crate::recipe::{IdentityContext, RecipeError, RecipeHandle};

/// Base-library functions that reach the filesystem.
const BLOCKED_GLOBALS: &[&str] = &["dofile", "loadfile", "load", "require"];

/// A recipe backed by Lua source.
#[derive(Debug, Clone)]
pub struct LuaRecipe {
    /// Chunk name used in Lua error messages (usually the file path)
    name: String,
    source: String,
}

impl LuaRecipe {
    /// Read a recipe from disk.
    pub fn load(path: &Path) -> Result<Self, RecipeError> {
        let source = std::fs::read_to_string(path).map_err(|source| RecipeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(LuaRecipe::from_source(path.display().to_string(), source))
    }

    /// Create a recipe from in-memory source.
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        LuaRecipe {
            name: name.into(),
            source: source.into(),
        }
    }

    fn lua_error(&self, err: mlua::Error) -> RecipeError {
        RecipeError::Lua {
            path: self.name.clone(),
            message: err.to_string(),
        }
    }

    fn evaluate(&self, identity: &IdentityContext) -> Result<Vec<String>, RecipeError> {
        let lua = sandbox(&self.name).map_err(|e| self.lua_error(e))?;

        let value: Value = lua
            .load(self.source.as_str())
            .set_name(format!("@{}", self.name))
            .eval()
            .map_err(|e| self.lua_error(e))?;

        let Value::Table(recipe) = value else {
            return Err(RecipeError::NotARecipe {
                path: self.name.clone(),
            });
        };

        self.bind_identity(&recipe, identity)
            .map_err(|e| self.lua_error(e))?;

        let declared = Rc::new(RefCell::new(self.static_requires(&recipe)?));

        let requirements: Value = recipe.get("requirements").map_err(|e| self.lua_error(e))?;
        if let Value::Function(requirements) = requirements {
            self.run_requirements(&lua, &recipe, requirements, Rc::clone(&declared))
                .map_err(|e| self.lua_error(e))?;
        }

        let declared = declared.borrow().clone();
        debug!("{} declares {} requirement(s)", self.name, declared.len());
        Ok(declared)
    }

    fn bind_identity(&self, recipe: &Table, identity: &IdentityContext) -> mlua::Result<()> {
        recipe.set("user", identity.user.as_str())?;
        recipe.set("channel", identity.channel.as_str())?;
        recipe.set("profile", identity.profile.as_str())?;
        Ok(())
    }

    /// Read the static `requires` field: nil, a single string, or a list.
    fn static_requires(&self, recipe: &Table) -> Result<Vec<String>, RecipeError> {
        let invalid = || RecipeError::InvalidRequires {
            path: self.name.clone(),
        };

        match recipe.get::<Value>("requires").map_err(|e| self.lua_error(e))? {
            Value::Nil => Ok(Vec::new()),
            Value::String(s) => Ok(vec![s.to_string_lossy().to_string()]),
            Value::Table(list) => list
                .sequence_values::<String>()
                .collect::<mlua::Result<Vec<_>>>()
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    /// Swap `requires` for a collector and call `recipe:requirements()`.
    fn run_requirements(
        &self,
        lua: &Lua,
        recipe: &Table,
        requirements: Function,
        declared: Rc<RefCell<Vec<String>>>,
    ) -> mlua::Result<()> {
        let collect = lua.create_function(move |_, (_recipe, requirement): (Value, String)| {
            declared.borrow_mut().push(requirement);
            Ok(())
        })?;
        recipe.set("requires", collect)?;
        requirements.call::<()>(recipe.clone())
    }
}

impl RecipeHandle for LuaRecipe {
    fn dependencies(&self, identity: &IdentityContext) -> Result<Vec<String>, RecipeError> {
        self.evaluate(identity)
    }
}

/// Create a fresh, restricted Lua state for one evaluation.
fn sandbox(chunk: &str) -> mlua::Result<Lua> {
    let lua = Lua::new_with(
        StdLib::TABLE | StdLib::STRING | StdLib::MATH | StdLib::UTF8,
        LuaOptions::default(),
    )?;

    let globals = lua.globals();
    for name in BLOCKED_GLOBALS {
        globals.set(*name, Value::Nil)?;
    }

    // Recipe output goes to the log instead of stdout.
    let chunk = chunk.to_string();
    let print = lua.create_function(move |lua, args: Variadic<Value>| {
        let tostring: Function = lua.globals().get("tostring")?;
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(tostring.call::<String>(arg)?);
        }
        info!(target: "foundry::recipe", "[{}] {}", chunk, parts.join("\t"));
        Ok(())
    })?;
    globals.set("print", print)?;

    Ok(lua)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> IdentityContext {
        IdentityContext {
            user: "foundry".to_string(),
            channel: "stable".to_string(),
            profile: "default".to_string(),
        }
    }

    fn eval(source: &str) -> Result<Vec<String>, RecipeError> {
        LuaRecipe::from_source("test.lua", source).dependencies(&identity())
    }

    #[test]
    fn test_static_requires_list() {
        let deps = eval(
            r#"
            return {
                name = "libfoo",
                requires = { "libbar/1.0@foundry/stable", "zlib/1.2.13@conan/stable" },
            }
        "#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec!["libbar/1.0@foundry/stable", "zlib/1.2.13@conan/stable"]
        );
    }

    #[test]
    fn test_static_requires_single_string() {
        let deps = eval(r#"return { requires = "libbar/1.0@foundry/stable" }"#).unwrap();
        assert_eq!(deps, vec!["libbar/1.0@foundry/stable"]);
    }

    #[test]
    fn test_no_requires() {
        assert!(eval("return { name = \"leaf\" }").unwrap().is_empty());
    }

    #[test]
    fn test_requirements_uses_identity() {
        let deps = eval(
            r#"
            local recipe = { requires = { "static/1.0@foundry/stable" } }
            function recipe:requirements()
                self:requires("dynamic/2.0@" .. self.user .. "/" .. self.channel)
                if self.profile == "default" then
                    self:requires("extra/3.0@" .. self.user .. "/" .. self.channel)
                end
            end
            return recipe
        "#,
        )
        .unwrap();

        assert_eq!(
            deps,
            vec![
                "static/1.0@foundry/stable",
                "dynamic/2.0@foundry/stable",
                "extra/3.0@foundry/stable",
            ]
        );
    }

    #[test]
    fn test_not_a_table() {
        assert!(matches!(
            eval("return 42"),
            Err(RecipeError::NotARecipe { .. })
        ));
        assert!(matches!(eval(""), Err(RecipeError::NotARecipe { .. })));
    }

    #[test]
    fn test_invalid_requires() {
        assert!(matches!(
            eval("return { requires = 7 }"),
            Err(RecipeError::InvalidRequires { .. })
        ));
        assert!(matches!(
            eval("return { requires = { {} } }"),
            Err(RecipeError::InvalidRequires { .. })
        ));
    }

    #[test]
    fn test_runtime_error() {
        let err = eval(
            r#"
            local recipe = {}
            function recipe:requirements() error("boom") end
            return recipe
        "#,
        )
        .unwrap_err();

        match err {
            RecipeError::Lua { message, .. } => assert!(message.contains("boom")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            eval("return {"),
            Err(RecipeError::Lua { .. })
        ));
    }

    #[test]
    fn test_sandbox_has_no_os_or_io() {
        assert!(matches!(
            eval("os.execute('true') return {}"),
            Err(RecipeError::Lua { .. })
        ));
        assert!(matches!(
            eval("io.open('/etc/passwd') return {}"),
            Err(RecipeError::Lua { .. })
        ));
        assert!(matches!(
            eval("dofile('/etc/passwd') return {}"),
            Err(RecipeError::Lua { .. })
        ));
    }

    #[test]
    fn test_print_is_allowed() {
        let deps = eval(r#"print("hello", 1, true) return {}"#).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_evaluations_are_isolated() {
        let recipe = LuaRecipe::from_source(
            "counter.lua",
            r#"
            counter = (counter or 0) + 1
            return { requires = { "dep/" .. counter .. "@foundry/stable" } }
        "#,
        );

        let first = recipe.dependencies(&identity()).unwrap();
        let second = recipe.dependencies(&identity()).unwrap();
        assert_eq!(first, vec!["dep/1@foundry/stable"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            LuaRecipe::load(Path::new("/nonexistent/recipe.lua")),
            Err(RecipeError::Io { .. })
        ));
    }
}
