// ==========================================
// Internationalization (i18n)
// ==========================================
// rust-i18n; Spanish (default) and English
// Note: the rust_i18n::i18n! macro is initialized in lib.rs
// ==========================================

/// Current locale
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// Switch locale
///
/// # Arguments
/// - locale: language code ("es" or "en")
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// Translate a message (no arguments)
///
/// # Example
/// ```no_run
/// use medequip_oms::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// Translate a message with arguments
///
/// # Example
/// ```no_run
/// use medequip_oms::i18n::t_with_args;
/// let msg = t_with_args("order.not_found", &[("id", "42")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // rust-i18n locale is global state and Rust tests run in parallel by
    // default; serialize the locale-sensitive tests.
    static LOCALE_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_set_locale() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("es");
        assert_eq!(current_locale(), "es");

        set_locale("en");
        assert_eq!(current_locale(), "en");

        set_locale("es");
    }

    #[test]
    fn test_translate_simple() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("es");
        assert_eq!(t("common.success"), "Operación exitosa");

        set_locale("en");
        assert_eq!(t("common.success"), "Operation successful");

        set_locale("es");
    }

    #[test]
    fn test_translate_with_args() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale("es");
        let msg = t_with_args("order.not_found", &[("id", "42")]);
        assert!(msg.contains("42"));
        assert!(msg.contains("no existe"));

        set_locale("es");
    }
}
