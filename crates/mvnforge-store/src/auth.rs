use reqwest::RequestBuilder;

/// Credentials for a single repository, read from the environment by
/// convention: `MVNFORGE_REPO_<ID>_USERNAME`/`_PASSWORD` for basic auth, or
/// `MVNFORGE_REPO_<ID>_TOKEN` for a bearer token. `<ID>` is the repository
/// id, upper-cased with non-alphanumeric characters replaced by `_`.
#[derive(Debug, Clone)]
pub enum Credentials {
    Basic { username: String, password: String },
    Bearer { token: String },
}

fn env_key(repo_id: &str, suffix: &str) -> String {
    let normalized: String = repo_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("MVNFORGE_REPO_{normalized}_{suffix}")
}

/// Looks up credentials for `repo_id` from the process environment.
/// Returns `None` if neither a token nor a username/password pair is set.
pub fn credentials_for(repo_id: &str) -> Option<Credentials> {
    if let Ok(token) = std::env::var(env_key(repo_id, "TOKEN")) {
        return Some(Credentials::Bearer { token });
    }
    let username = std::env::var(env_key(repo_id, "USERNAME")).ok()?;
    let password = std::env::var(env_key(repo_id, "PASSWORD")).ok()?;
    Some(Credentials::Basic { username, password })
}

/// Applies the repository's credentials, if any, to an outgoing request.
pub fn apply_auth(builder: RequestBuilder, repo_id: &str) -> RequestBuilder {
    match credentials_for(repo_id) {
        Some(Credentials::Basic { username, password }) => {
            builder.basic_auth(username, Some(password))
        }
        Some(Credentials::Bearer { token }) => builder.bearer_auth(token),
        None => builder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn env_key_normalizes_repo_id() {
        assert_eq!(env_key("my-repo.1", "TOKEN"), "MVNFORGE_REPO_MY_REPO_1_TOKEN");
    }

    #[test]
    fn no_credentials_when_env_unset() {
        std::env::remove_var(env_key("unset-repo", "TOKEN"));
        std::env::remove_var(env_key("unset-repo", "USERNAME"));
        std::env::remove_var(env_key("unset-repo", "PASSWORD"));
        assert!(credentials_for("unset-repo").is_none());
    }
}
