// src/core/context.rs

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{INCLUDE_SEPARATOR, MANIFEST_FILENAME};
use crate::core::paths;
use crate::core::rule::{Rule, RuleError, RuleKind};
use crate::models::{DedicatedConfig, LoadedConfig, PackageManifest, RewriteConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Error de Ficheros: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error al parsear TOML en '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Configuración: el campo \"{field}\" debe ser una lista.")]
    FieldNotAList { field: &'static str },
    #[error("Configuración: las entradas de \"{field}\" deben ser cadenas.")]
    EntryNotAString { field: &'static str },
    #[error("Configuración: una entrada de \"map\" debe ser una cadena o una lista de 1 a 3 cadenas.")]
    InvalidMapEntry,
    #[error("Error de regla: {0}")]
    Rule(#[from] RuleError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// El ámbito de resolución de un directorio base: posee la lista ordenada de
/// reglas (la más reciente primero) y las rutas de búsqueda pre/post.
///
/// Un contexto solo se muta durante su construcción (al aplicar la
/// configuración descubierta) o a través de los puntos públicos de registro;
/// el algoritmo de resolución lo trata como de solo lectura.
#[derive(Debug)]
pub struct Context {
    /// Directorio base; vacío solo para el contexto global.
    base: PathBuf,
    /// Nombre a mostrar; por defecto generado por contador, lo puede
    /// sobrescribir el `name` de la configuración descubierta.
    name: String,
    rules: Vec<Rule>,
    pre_includes: Vec<PathBuf>,
    post_includes: Vec<PathBuf>,
}

impl Context {
    pub fn new(base: PathBuf, name: String) -> Self {
        Self {
            base,
            name,
            rules: Vec::new(),
            pre_includes: Vec::new(),
            post_includes: Vec::new(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn pre(&self) -> &[PathBuf] {
        &self.pre_includes
    }

    pub fn post(&self) -> &[PathBuf] {
        &self.post_includes
    }

    /// Registra una regla. Si `destination` se omite, el destino es el propio
    /// origen: un alias identidad que aun así "reclama" la petición. La regla
    /// se inserta al FRENTE: la última registrada tiene máxima prioridad.
    pub fn use_rule(
        &mut self,
        source: &str,
        destination: Option<&str>,
        kind: RuleKind,
    ) -> ConfigResult<()> {
        let destination = destination.unwrap_or(source);
        let rule = Rule::make(kind, source, destination)?;
        self.add(rule);
        Ok(())
    }

    /// Registra una función de resolución arbitraria, con la misma prioridad
    /// de inserción al frente.
    pub fn use_custom(&mut self, f: impl Fn(&str) -> Option<String> + 'static) {
        self.add(Rule::custom(f));
    }

    fn add(&mut self, rule: Rule) {
        self.rules.insert(0, rule);
    }

    /// Vacía las reglas y las rutas de búsqueda. Se usa cuando la carga de
    /// configuración falla: el contexto queda registrado pero limpio.
    pub fn reset(&mut self) {
        self.rules.clear();
        self.pre_includes.clear();
        self.post_includes.clear();
    }

    /// Evalúa las reglas en orden de prioridad y devuelve la primera
    /// coincidencia, hecha absoluta contra el directorio base.
    pub fn resolve(&self, request: &str) -> Option<PathBuf> {
        for rule in &self.rules {
            if let Some(rewritten) = rule.evaluate(request) {
                let resolved = paths::resolve_in(&self.base, &rewritten);
                log::debug!("({}) reescritura {} => {:?}", self.name, request, resolved);
                return Some(resolved);
            }
        }
        None
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        paths::resolve_in(&self.base, path)
    }

    fn resolve_paths(&self, items: &[String]) -> Vec<PathBuf> {
        items.iter().map(|p| self.resolve_path(p)).collect()
    }

    /// Consume una sección de configuración: valida las formas de lista
    /// (el error nombra el campo ofensivo), divide `include` en pre/post por
    /// el separador, hace absolutas las rutas y registra cada entrada de
    /// `map` como regla.
    pub fn apply_config(&mut self, config: &RewriteConfig) -> ConfigResult<()> {
        if let Some(include) = &config.include {
            let items = string_list(include, "include")?;
            if let Some(i) = items.iter().position(|item| item == INCLUDE_SEPARATOR) {
                self.pre_includes = self.resolve_paths(&items[..i]);
                self.post_includes = self.resolve_paths(&items[i + 1..]);
            } else {
                self.pre_includes = self.resolve_paths(&items);
            }
        } else {
            // ## compatibilidad 0.1.x: listas `before`/`after` separadas.
            if let Some(before) = &config.before {
                let items = string_list(before, "before")?;
                self.pre_includes = self.resolve_paths(&items);
            }
            if let Some(after) = &config.after {
                let items = string_list(after, "after")?;
                self.post_includes = self.resolve_paths(&items);
            }
        }

        if let Some(map) = &config.map {
            let entries = map
                .as_array()
                .ok_or(ConfigError::FieldNotAList { field: "map" })?;
            for entry in entries {
                self.apply_map_entry(entry)?;
            }
        }

        Ok(())
    }

    fn apply_map_entry(&mut self, entry: &toml::Value) -> ConfigResult<()> {
        match entry {
            // Alias abreviado: el destino es el propio origen.
            toml::Value::String(source) => self.use_rule(source, None, RuleKind::Alias),
            toml::Value::Array(parts) => {
                let parts: Vec<&str> = parts
                    .iter()
                    .map(toml::Value::as_str)
                    .collect::<Option<_>>()
                    .ok_or(ConfigError::InvalidMapEntry)?;
                match parts.as_slice() {
                    [source] => self.use_rule(source, None, RuleKind::Alias),
                    [source, destination] => {
                        self.use_rule(source, Some(destination), RuleKind::Alias)
                    }
                    [source, destination, kind] => {
                        self.use_rule(source, Some(destination), RuleKind::parse(kind)?)
                    }
                    _ => Err(ConfigError::InvalidMapEntry),
                }
            }
            _ => Err(ConfigError::InvalidMapEntry),
        }
    }
}

/// Interpreta un `toml::Value` como lista de cadenas, nombrando el campo en
/// el error si la forma no es la esperada.
fn string_list(value: &toml::Value, field: &'static str) -> ConfigResult<Vec<String>> {
    let array = value
        .as_array()
        .ok_or(ConfigError::FieldNotAList { field })?;
    array
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or(ConfigError::EntryNotAString { field })
        })
        .collect()
}

/// Carga una fuente de configuración desde el disco. Para el manifiesto
/// genérico (`package.toml`) la sección vive anidada bajo `[rewire]`; para
/// los archivos dedicados es el documento entero. En ambos casos un `name`
/// de nivel superior pasa a ser el nombre a mostrar del contexto.
pub fn load_config(path: &Path) -> ConfigResult<LoadedConfig> {
    let content = fs::read_to_string(path)?;
    let parse_err = |e: toml::de::Error| ConfigError::TomlParse {
        path: path.display().to_string(),
        source: e,
    };

    if path.file_name().and_then(|n| n.to_str()) == Some(MANIFEST_FILENAME) {
        let manifest: PackageManifest = toml::from_str(&content).map_err(parse_err)?;
        Ok(LoadedConfig {
            name: manifest.name,
            config: manifest.rewire,
        })
    } else {
        let dedicated: DedicatedConfig = toml::from_str(&content).map_err(parse_err)?;
        Ok(LoadedConfig {
            name: dedicated.name,
            config: Some(dedicated.config),
        })
    }
}
