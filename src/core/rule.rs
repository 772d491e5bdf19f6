// src/core/rule.rs

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Tipo de regla desconocido '{kind}'. Solo se permiten: alias, match.")]
    UnknownKind { kind: String },
    #[error("Expresión regular inválida '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Una regla personalizada solo puede registrarse con una función, no desde la configuración.")]
    CustomFromConfig,
}

type RuleResult<T> = Result<T, RuleError>;

/// Una función de resolución arbitraria: petición => reescritura (o nada).
pub type CustomResolver = Box<dyn Fn(&str) -> Option<String>>;

/// La etiqueta de variante de una regla, para introspección y para
/// interpretar el tercer elemento de una entrada de `map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Alias,
    Pattern,
    Custom,
}

impl RuleKind {
    /// Interpreta el tipo tal y como aparece en la configuración.
    pub fn parse(kind: &str) -> RuleResult<Self> {
        match kind {
            "alias" => Ok(RuleKind::Alias),
            "match" => Ok(RuleKind::Pattern),
            other => Err(RuleError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Alias => write!(f, "alias"),
            RuleKind::Pattern => write!(f, "match"),
            RuleKind::Custom => write!(f, "custom"),
        }
    }
}

/// Una regla de reescritura. Las tres variantes se construyen a través de una
/// única fábrica (`make` / `custom`), nunca por inspección de tipos en
/// tiempo de ejecución.
pub enum Rule {
    /// Reescribe vía expresión regular: si `expr` coincide con la petición,
    /// la primera coincidencia se sustituye por la plantilla (`$1`, ...).
    Pattern { expr: Regex, replacement: String },
    /// Reescribe por prefijo literal: si la petición empieza por `prefix`,
    /// este se sustituye por `replacement`.
    Alias { prefix: String, replacement: String },
    /// Una función de resolución proporcionada por el código anfitrión.
    Custom(CustomResolver),
}

impl Rule {
    /// Construye una regla del tipo pedido. Las reglas personalizadas no se
    /// pueden construir desde (origen, destino); usa `Rule::custom`.
    pub fn make(kind: RuleKind, source: &str, destination: &str) -> RuleResult<Rule> {
        match kind {
            RuleKind::Alias => Ok(Rule::Alias {
                prefix: source.to_string(),
                replacement: destination.to_string(),
            }),
            RuleKind::Pattern => {
                let expr = Regex::new(source).map_err(|e| RuleError::InvalidPattern {
                    pattern: source.to_string(),
                    source: e,
                })?;
                Ok(Rule::Pattern {
                    expr,
                    replacement: destination.to_string(),
                })
            }
            RuleKind::Custom => Err(RuleError::CustomFromConfig),
        }
    }

    pub fn custom(f: impl Fn(&str) -> Option<String> + 'static) -> Rule {
        Rule::Custom(Box::new(f))
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Pattern { .. } => RuleKind::Pattern,
            Rule::Alias { .. } => RuleKind::Alias,
            Rule::Custom(_) => RuleKind::Custom,
        }
    }

    /// Evalúa la regla contra una petición. `Some` detiene la evaluación de
    /// las reglas restantes; una reescritura idéntica a la petición cuenta
    /// como coincidencia. Una reescritura vacía NO cuenta: cae a la
    /// siguiente regla.
    pub fn evaluate(&self, request: &str) -> Option<String> {
        let rewritten = match self {
            // La misma expresión decide la coincidencia y hace la
            // sustitución, así el resultado es determinista.
            Rule::Pattern { expr, replacement } => {
                if !expr.is_match(request) {
                    return None;
                }
                expr.replace(request, replacement.as_str()).into_owned()
            }
            Rule::Alias { prefix, replacement } => {
                let rest = request.strip_prefix(prefix.as_str())?;
                format!("{replacement}{rest}")
            }
            Rule::Custom(f) => f(request)?,
        };
        if rewritten.is_empty() {
            return None;
        }
        Some(rewritten)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Pattern { expr, replacement } => f
                .debug_struct("Pattern")
                .field("expr", &expr.as_str())
                .field("replacement", replacement)
                .finish(),
            Rule::Alias { prefix, replacement } => f
                .debug_struct("Alias")
                .field("prefix", prefix)
                .field("replacement", replacement)
                .finish(),
            Rule::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_sustituye_el_prefijo() {
        let rule = Rule::make(RuleKind::Alias, "@app", "/src").unwrap();
        assert_eq!(rule.evaluate("@app/utils"), Some("/src/utils".to_string()));
        assert_eq!(rule.evaluate("otra-cosa"), None);
    }

    #[test]
    fn alias_identidad_cuenta_como_coincidencia() {
        // destino == origen: la reescritura no cambia nada pero "reclama"
        // la petición.
        let rule = Rule::make(RuleKind::Alias, "lodash", "lodash").unwrap();
        assert_eq!(rule.evaluate("lodash"), Some("lodash".to_string()));
    }

    #[test]
    fn pattern_usa_grupos_de_captura() {
        let rule = Rule::make(RuleKind::Pattern, "^lib-(.*)$", "vendor/$1").unwrap();
        assert_eq!(rule.evaluate("lib-foo"), Some("vendor/foo".to_string()));
        assert_eq!(rule.evaluate("otra-lib"), None);
    }

    #[test]
    fn pattern_sin_cambio_sigue_siendo_coincidencia() {
        let rule = Rule::make(RuleKind::Pattern, "^lodash$", "lodash").unwrap();
        assert_eq!(rule.evaluate("lodash"), Some("lodash".to_string()));
    }

    #[test]
    fn una_reescritura_vacia_no_es_coincidencia() {
        let rule = Rule::make(RuleKind::Alias, "todo", "").unwrap();
        assert_eq!(rule.evaluate("todo"), None);
    }

    #[test]
    fn tipo_desconocido_falla_nombrando_los_permitidos() {
        let err = RuleKind::parse("regex").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("regex"));
        assert!(message.contains("alias"));
        assert!(message.contains("match"));
    }

    #[test]
    fn patron_invalido_falla_en_construccion() {
        assert!(Rule::make(RuleKind::Pattern, "(", "x").is_err());
    }

    #[test]
    fn regla_personalizada() {
        let rule = Rule::custom(|request| {
            request.eq("magia").then(|| "/opt/magia".to_string())
        });
        assert_eq!(rule.kind(), RuleKind::Custom);
        assert_eq!(rule.evaluate("magia"), Some("/opt/magia".to_string()));
        assert_eq!(rule.evaluate("normal"), None);
    }
}
