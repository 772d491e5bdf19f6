// src/core/locator.rs

use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILES;
use crate::core::paths::{parent_if, strip_to_dir};

/// Busca el archivo de configuración aplicable más cercano a `start`:
/// se prueba el propio directorio y después cada ancestro, devolviendo el
/// primer candidato de `CONFIG_FILES` (en su orden de prioridad) que exista.
///
/// Los fallos al consultar un candidato (permisos, etc.) se tratan como
/// ausencia, nunca como error. `None` significa que se alcanzó la raíz sin
/// encontrar nada.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = Some(strip_to_dir(start));
    while let Some(dir) = current {
        for name in CONFIG_FILES {
            let candidate = dir.join(name);
            // `is_file` absorbe los errores de stat.
            if candidate.is_file() {
                log::debug!("Configuración encontrada en {:?}", candidate);
                return Some(candidate);
            }
        }
        current = parent_if(dir);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        MANIFEST_FILENAME, REWIRE_CONFIG_FILENAME, REWIRE_HIDDEN_CONFIG_FILENAME,
    };
    use std::fs;

    #[test]
    fn encuentra_el_directorio_mas_cercano() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let deep = root.join("a/b/c");
        fs::create_dir_all(&deep).unwrap();
        fs::write(root.join(REWIRE_HIDDEN_CONFIG_FILENAME), "").unwrap();
        fs::write(root.join("a").join(MANIFEST_FILENAME), "").unwrap();

        // `a` está más cerca de `a/b/c` que la raíz, aunque la raíz tenga
        // un candidato de mayor prioridad.
        let found = find_config_file(&deep).unwrap();
        assert_eq!(found, root.join("a").join(MANIFEST_FILENAME));
    }

    #[test]
    fn respeta_la_prioridad_de_nombres_dentro_de_un_directorio() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join(MANIFEST_FILENAME), "").unwrap();
        fs::write(dir.join(REWIRE_HIDDEN_CONFIG_FILENAME), "").unwrap();
        fs::write(dir.join(REWIRE_CONFIG_FILENAME), "").unwrap();

        let found = find_config_file(dir).unwrap();
        assert_eq!(found, dir.join(REWIRE_CONFIG_FILENAME));
    }

    #[test]
    fn una_ruta_de_archivo_busca_desde_su_directorio() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join(REWIRE_CONFIG_FILENAME), "").unwrap();

        let found = find_config_file(&dir.join("main.rs")).unwrap();
        assert_eq!(found, dir.join(REWIRE_CONFIG_FILENAME));
    }

    #[test]
    fn devuelve_none_sin_configuracion() {
        let tmp = tempfile::tempdir().unwrap();
        // El árbol temporal está vacío; los ancestros reales del sistema
        // podrían tener configuración, así que solo comprobamos que el
        // resultado, si existe, no está dentro del árbol temporal.
        if let Some(found) = find_config_file(tmp.path()) {
            assert!(!found.starts_with(tmp.path()));
        }
    }
}
