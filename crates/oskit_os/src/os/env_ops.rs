use crate::random::TokenGenerator;

use super::Os;

impl Os {
    /// Value of an environment variable, `""` if unset or unreadable.
    pub fn get_environment_variable(&self, name: &str) -> String {
        let result = self.pal.env_var(name).map(Option::unwrap_or_default);
        self.or_sentinel("get_environment_variable", name, result, String::new())
    }

    /// Sets an environment variable for this process. `false` for names that are empty or
    /// contain `=` or NUL, and for values containing NUL.
    pub fn set_environment_variable(&self, name: &str, value: &str) -> bool {
        let result = self.pal.set_env_var(name, value);
        self.succeeded("set_environment_variable", name, result)
    }

    /// The current user's home directory, or `""` if it cannot be determined.
    pub fn home_directory(&self) -> String {
        let result = self.pal.home_directory();
        self.or_sentinel("home_directory", "~", result, String::new())
    }

    /// Replaces a leading `~` (alone or followed by a separator) with the home directory.
    ///
    /// `~user` forms and paths whose home cannot be resolved are returned unchanged.
    pub fn expand_user_home(&self, path: &str) -> String {
        let Some(rest) = path.strip_prefix('~') else {
            return path.to_string();
        };
        if rest.chars().next().is_some_and(|c| !self.platform.is_separator(c)) {
            return path.to_string();
        }
        let home = self.home_directory();
        if home.is_empty() {
            return path.to_string();
        }
        format!("{home}{rest}")
    }

    pub fn temporary_directory_path(&self) -> String {
        let result = self.pal.temp_directory();
        self.or_sentinel("temporary_directory_path", "", result, String::new())
    }

    /// Random alphanumeric string of `length` characters.
    ///
    /// Not suitable for secrets: the generator is a fast non-cryptographic PRNG.
    pub fn random_string(&self, length: usize) -> String {
        match &self.tokens {
            Some(tokens) => tokens.generate(length),
            None => TokenGenerator::shared().generate(length),
        }
    }

    /// `\` on Windows, `/` elsewhere.
    pub fn path_separator(&self) -> char {
        self.platform.separator()
    }

    /// `;` on Windows, `:` elsewhere.
    pub fn path_list_separator(&self) -> char {
        self.platform.path_list_separator()
    }

    pub fn line_separator(&self) -> &'static str {
        self.platform.line_separator()
    }
}
