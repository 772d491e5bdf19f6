// src/models.rs

use serde::Deserialize;

// --- MODELOS DE LAS FUENTES DE CONFIGURACIÓN (PARA TOML) ---
// Estos son los que el usuario escribe en rewire.toml / .rewire.toml / package.toml

/// La sección de reescritura tal y como se lee del archivo.
///
/// Los campos se dejan como `toml::Value` crudos a propósito: la validación de
/// forma (¿es una lista?, ¿son cadenas?) ocurre en `Context::apply_config`,
/// que puede así fallar nombrando el campo ofensivo.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RewriteConfig {
    /// Lista de rutas de búsqueda; puede contener el separador `%` que la
    /// divide en "pre" y "post".
    pub include: Option<toml::Value>,

    // ## compatibilidad 0.1.x: listas separadas, usadas solo si no hay `include`.
    pub before: Option<toml::Value>,
    pub after: Option<toml::Value>,

    /// Lista de reglas de reescritura: cada entrada es una cadena (alias
    /// abreviado) o una lista `[origen, destino?, tipo?]`.
    pub map: Option<toml::Value>,
}

/// Un archivo de configuración dedicado: la sección de reescritura en el
/// nivel superior, más un `name` opcional para el contexto.
#[derive(Deserialize, Debug, Default)]
pub struct DedicatedConfig {
    pub name: Option<String>,
    #[serde(flatten)]
    pub config: RewriteConfig,
}

/// El manifiesto genérico de proyecto (`package.toml`): la configuración de
/// reescritura vive anidada bajo `[rewire]`.
#[derive(Deserialize, Debug, Default)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub rewire: Option<RewriteConfig>,
}

/// El resultado de cargar cualquiera de las fuentes: una sección de
/// configuración (si el archivo declara alguna) y un nombre a mostrar.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub name: Option<String>,
    pub config: Option<RewriteConfig>,
}
