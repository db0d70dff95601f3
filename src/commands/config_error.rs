//! Setup instructions shown when the backend is not configured.

use crate::config::{Config, ENV_SUPABASE_ANON_KEY, ENV_SUPABASE_URL};

/// Renders the configuration-error view for the given missing settings.
pub fn config_error_view(missing: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("Configuration requise\n");
    out.push_str("=====================\n\n");

    out.push_str("Variables d'environnement manquantes\n");
    out.push_str("  Les variables d'environnement Supabase ne sont pas configurées.\n");
    for name in missing {
        out.push_str(&format!("  - {}\n", name));
    }
    out.push('\n');

    out.push_str("Comment configurer :\n");
    let steps = [
        "Créez un compte sur https://supabase.com",
        "Créez un nouveau projet",
        "Exécutez le script SQL fourni dans l'éditeur SQL de Supabase",
        "Dans les paramètres du projet, trouvez l'URL et la clé API anonyme",
        "Définissez ces variables d'environnement, ou ajoutez-les au fichier de configuration",
    ];
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, step));
    }
    out.push('\n');

    out.push_str(&format!("    {}=votre_url_supabase\n", ENV_SUPABASE_URL));
    out.push_str(&format!(
        "    {}=votre_cle_anon_supabase\n\n",
        ENV_SUPABASE_ANON_KEY
    ));

    out.push_str(&format!(
        "Fichier de configuration : {}\n",
        Config::default_config_path().display()
    ));
    out.push_str("Après avoir configuré ces variables, relancez la commande.\n");
    out
}
