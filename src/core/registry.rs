// src/core/registry.rs

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::constants::{GLOBAL_CONFIG_DIR, REWIRE_CONFIG_FILENAME};
use crate::core::context::{self, ConfigResult, Context};
use crate::core::locator;
use crate::core::paths::{fs_root_of, parent_if, strip_to_dir};
use crate::core::rule::RuleKind;

/// Un contexto compartido. La ejecución es monohilo (ver el modelo de
/// concurrencia): `Rc<RefCell<_>>` basta y los contextos son estables por
/// referencia durante toda la vida del proceso.
pub type SharedContext = Rc<RefCell<Context>>;

/// El registro de contextos: directorio base => contexto. Se puebla de forma
/// perezosa, se escribe una sola vez por clave y nunca se desaloja.
///
/// No es un singleton oculto: el embebedor construye una instancia al inicio
/// del proceso y la conserva; las pruebas construyen una nueva cada vez.
pub struct Registry {
    contexts: HashMap<PathBuf, SharedContext>,
    /// El contexto global, consultado siempre el primero. Su base está
    /// VACÍA: no es el mismo que el contexto creado para la raíz `/`
    /// cuando no se encuentra configuración.
    global: SharedContext,
    /// Contador para los nombres a mostrar generados.
    counter: usize,
}

impl Registry {
    /// El contexto global se construye aquí, antes de que pueda existir
    /// ningún contexto de paquete.
    pub fn new() -> Self {
        let global = Rc::new(RefCell::new(Context::new(
            PathBuf::new(),
            "Resolver 0".to_string(),
        )));
        Self {
            contexts: HashMap::new(),
            global,
            counter: 1,
        }
    }

    fn next_name(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        format!("Resolver {n}")
    }

    pub fn global(&self) -> SharedContext {
        Rc::clone(&self.global)
    }

    /// Ruta rápida (sin tocar el disco): sube por los ancestros de `path`
    /// buscando un contexto YA registrado. `None` si no hay ninguno.
    pub fn find(&self, path: &Path) -> Option<SharedContext> {
        let mut current = Some(strip_to_dir(path));
        while let Some(dir) = current {
            if let Some(found) = self.contexts.get(dir) {
                return Some(Rc::clone(found));
            }
            current = parent_if(dir);
        }
        None
    }

    /// Ruta completa: ejecuta el localizador de configuración desde `path`.
    /// El directorio del archivo encontrado (o la raíz del sistema de
    /// archivos si no hay ninguno) es el candidato a base; si ya está
    /// registrado se devuelve el contexto cacheado, si no se construye uno
    /// nuevo cargando su configuración.
    pub fn get_or_create(&mut self, path: &Path) -> ConfigResult<SharedContext> {
        let config_file = locator::find_config_file(path);
        let base = match &config_file {
            Some(file) => file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| fs_root_of(path)),
            None => fs_root_of(path),
        };
        if let Some(existing) = self.contexts.get(&base) {
            return Ok(Rc::clone(existing));
        }
        self.create(base, config_file)
    }

    fn create(
        &mut self,
        base: PathBuf,
        config_file: Option<PathBuf>,
    ) -> ConfigResult<SharedContext> {
        let name = self.next_name();
        let ctx = Rc::new(RefCell::new(Context::new(base.clone(), name)));

        // Registrar ANTES de cargar la configuración: así una carga fallida,
        // o una re-entrante que resuelva de vuelta por este directorio, no
        // vuelve a construir el contexto.
        self.contexts.insert(base, Rc::clone(&ctx));

        if let Some(file) = config_file {
            if let Err(e) = configure(&ctx, &file) {
                // Vaciar, pero mantener registrado: sin reintentos y sin
                // reglas aplicadas a medias.
                ctx.borrow_mut().reset();
                log::warn!(
                    "({}) configuración inválida en {:?}: el contexto queda vacío.",
                    ctx.borrow().name(),
                    file
                );
                return Err(e);
            }
        }

        {
            let ctx_ref = ctx.borrow();
            log::debug!("({}) nuevo contexto para {:?}", ctx_ref.name(), ctx_ref.base());
        }
        Ok(ctx)
    }

    /// Configuración opcional del contexto global, leída de
    /// `~/.config/rewire/rewire.toml` (o el equivalente de la plataforma).
    pub fn load_global_config(&mut self) -> ConfigResult<()> {
        let Some(config_dir) = dirs::config_dir() else {
            log::warn!("No se pudo encontrar el directorio de configuración del sistema.");
            return Ok(());
        };
        let file = config_dir.join(GLOBAL_CONFIG_DIR).join(REWIRE_CONFIG_FILENAME);
        if !file.is_file() {
            return Ok(());
        }
        log::info!("Cargando configuración global desde {:?}", file);
        if let Err(e) = configure(&self.global, &file) {
            self.global.borrow_mut().reset();
            return Err(e);
        }
        Ok(())
    }

    /// La fábrica pública: descubre (o crea) el contexto de `path` y
    /// devuelve su interfaz para el código anfitrión.
    pub fn scope(&mut self, path: &Path) -> ConfigResult<Scope> {
        let context = self.get_or_create(path)?;
        Ok(Scope {
            context,
            global: Rc::clone(&self.global),
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Carga y aplica un archivo de configuración sobre un contexto.
fn configure(ctx: &SharedContext, file: &Path) -> ConfigResult<()> {
    let loaded = context::load_config(file)?;
    let mut ctx = ctx.borrow_mut();
    if let Some(name) = loaded.name {
        ctx.set_name(name);
    }
    if let Some(config) = loaded.config {
        log::debug!("({}) configuración cargada desde {:?}", ctx.name(), file);
        ctx.apply_config(&config)?;
    }
    Ok(())
}

/// La interfaz pública de un contexto, tal y como la ve el código anfitrión:
/// registro programático de reglas y vistas de solo lectura.
pub struct Scope {
    context: SharedContext,
    global: SharedContext,
}

impl Scope {
    /// Registra una regla en este contexto. `destination` omitido equivale
    /// a un alias identidad sobre `source`.
    pub fn use_rule(
        &self,
        source: &str,
        destination: Option<&str>,
        kind: RuleKind,
    ) -> ConfigResult<()> {
        self.context.borrow_mut().use_rule(source, destination, kind)
    }

    /// Registra una función de resolución arbitraria.
    pub fn use_custom(&self, f: impl Fn(&str) -> Option<String> + 'static) {
        self.context.borrow_mut().use_custom(f);
    }

    pub fn name(&self) -> String {
        self.context.borrow().name().to_string()
    }

    pub fn pre(&self) -> Vec<PathBuf> {
        self.context.borrow().pre().to_vec()
    }

    pub fn post(&self) -> Vec<PathBuf> {
        self.context.borrow().post().to_vec()
    }

    /// La interfaz del contexto global. `global().global()` es él mismo.
    pub fn global(&self) -> Scope {
        Scope {
            context: Rc::clone(&self.global),
            global: Rc::clone(&self.global),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MANIFEST_FILENAME, REWIRE_CONFIG_FILENAME};
    use std::fs;

    #[test]
    fn get_or_create_es_idempotente_y_estable_por_referencia() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("src/deep")).unwrap();
        fs::write(
            root.join(MANIFEST_FILENAME),
            "name = \"mi-paquete\"\n\n[rewire]\nmap = [[\"@app\", \"src\"]]\n",
        )
        .unwrap();

        let mut registry = Registry::new();
        let first = registry.get_or_create(&root.join("src")).unwrap();
        // Otra ruta bajo la misma configuración: mismo contexto, misma Rc.
        let second = registry.get_or_create(&root.join("src/deep")).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.borrow().base(), root);
        assert_eq!(first.borrow().name(), "mi-paquete");
    }

    #[test]
    fn la_configuracion_se_aplica_exactamente_una_vez() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join(REWIRE_CONFIG_FILENAME), "name = \"primero\"\n").unwrap();

        let mut registry = Registry::new();
        let ctx = registry.get_or_create(root).unwrap();
        assert_eq!(ctx.borrow().name(), "primero");

        // Si el archivo se releyera, el nombre cambiaría.
        fs::write(root.join(REWIRE_CONFIG_FILENAME), "name = \"segundo\"\n").unwrap();
        let again = registry.get_or_create(root).unwrap();
        assert!(Rc::ptr_eq(&ctx, &again));
        assert_eq!(again.borrow().name(), "primero");
    }

    #[test]
    fn una_configuracion_invalida_falla_una_sola_vez() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join(REWIRE_CONFIG_FILENAME), "map = \"not-an-array\"\n").unwrap();

        let mut registry = Registry::new();
        // La primera creación propaga el error de configuración...
        assert!(registry.get_or_create(root).is_err());

        // ...pero el contexto queda registrado y vacío: el segundo intento no
        // relee el archivo (lo arreglamos en disco y sigue vacío) ni falla.
        fs::write(
            root.join(REWIRE_CONFIG_FILENAME),
            "map = [[\"@app\", \"src\"]]\n",
        )
        .unwrap();
        let ctx = registry.get_or_create(root).unwrap();
        assert!(ctx.borrow().rules().is_empty());
        assert_eq!(ctx.borrow().resolve("@app/utils"), None);
    }

    #[test]
    fn find_no_toca_el_disco_y_sube_por_los_ancestros() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join(REWIRE_CONFIG_FILENAME), "").unwrap();

        let mut registry = Registry::new();
        // Sin creación previa, `find` no descubre nada aunque el archivo exista.
        assert!(registry.find(&root.join("a/b")).is_none());

        let created = registry.get_or_create(root).unwrap();
        let found = registry.find(&root.join("a/b/mod.rs")).unwrap();
        assert!(Rc::ptr_eq(&created, &found));
    }

    #[test]
    fn el_contexto_global_tiene_base_vacia_y_no_vive_en_el_mapa() {
        let registry = Registry::new();
        let global = registry.global();
        assert!(global.borrow().base().as_os_str().is_empty());
        assert_eq!(global.borrow().name(), "Resolver 0");
        // El mapa de paquetes no lo conoce.
        assert!(registry.find(Path::new("/")).is_none());
    }

    #[test]
    fn scope_expone_reglas_y_rutas() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::write(
            root.join(REWIRE_CONFIG_FILENAME),
            "include = [\"lib\", \"%\", \"fallback\"]\n",
        )
        .unwrap();

        let mut registry = Registry::new();
        let scope = registry.scope(root).unwrap();
        assert_eq!(scope.pre(), vec![root.join("lib")]);
        assert_eq!(scope.post(), vec![root.join("fallback")]);

        scope.use_rule("@app", Some("/src"), RuleKind::Alias).unwrap();
        scope.global().use_rule("lodash", None, RuleKind::Alias).unwrap();
        assert_eq!(registry.global().borrow().rules().len(), 1);
    }
}
