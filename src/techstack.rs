//! Technology detection tables and the pure inference functions over them.
//!
//! The tables are data, not logic: callers can extend a [`TechLexicon`]
//! without touching the enrichment pipeline.

/// Canonical technology names keyed by well-known configuration filenames.
/// Matched case-insensitively against the exact basename.
const FILE_TECH: &[(&str, &str)] = &[
    // Package managers
    ("package.json", "Node.js"),
    ("package-lock.json", "npm"),
    ("yarn.lock", "Yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("requirements.txt", "Python"),
    ("pipfile", "Python"),
    ("pyproject.toml", "Python"),
    ("poetry.lock", "Poetry"),
    ("composer.json", "PHP"),
    ("composer.lock", "Composer"),
    ("gemfile", "Ruby"),
    ("gemfile.lock", "Bundler"),
    ("cargo.toml", "Rust"),
    ("cargo.lock", "Cargo"),
    ("go.mod", "Go"),
    ("go.sum", "Go Modules"),
    ("pom.xml", "Maven"),
    ("build.gradle", "Gradle"),
    ("build.gradle.kts", "Gradle"),
    // Frameworks
    ("next.config.js", "Next.js"),
    ("next.config.mjs", "Next.js"),
    ("next.config.ts", "Next.js"),
    ("nuxt.config.js", "Nuxt"),
    ("nuxt.config.ts", "Nuxt"),
    ("vue.config.js", "Vue"),
    ("angular.json", "Angular"),
    ("svelte.config.js", "Svelte"),
    ("gatsby-config.js", "Gatsby"),
    // Build tools
    ("webpack.config.js", "Webpack"),
    ("vite.config.js", "Vite"),
    ("vite.config.ts", "Vite"),
    ("rollup.config.js", "Rollup"),
    ("gulpfile.js", "Gulp"),
    // Deployment
    ("dockerfile", "Docker"),
    ("docker-compose.yml", "Docker Compose"),
    ("docker-compose.yaml", "Docker Compose"),
    ("vercel.json", "Vercel"),
    ("netlify.toml", "Netlify"),
    // Testing
    ("jest.config.js", "Jest"),
    ("jest.config.ts", "Jest"),
    ("cypress.config.js", "Cypress"),
    ("cypress.config.ts", "Cypress"),
    ("playwright.config.js", "Playwright"),
    ("playwright.config.ts", "Playwright"),
    // Styling
    ("tailwind.config.js", "Tailwind CSS"),
    ("tailwind.config.ts", "Tailwind CSS"),
    ("postcss.config.js", "PostCSS"),
    // ORMs
    ("schema.prisma", "Prisma"),
    // Misc
    ("tsconfig.json", "TypeScript"),
    ("makefile", "Make"),
    ("cmakelists.txt", "CMake"),
];

/// Free-text vocabulary for the fallback keyword scan. Matched as whole
/// words, case-insensitively, against descriptions and AI summaries.
const TEXT_TECH: &[&str] = &[
    // Frontend frameworks and libraries
    "React",
    "Next.js",
    "Vue.js",
    "Angular",
    "Svelte",
    "Nuxt.js",
    "Gatsby",
    "jQuery",
    // Backend frameworks
    "Express",
    "Fastify",
    "NestJS",
    "Django",
    "Flask",
    "FastAPI",
    "Spring Boot",
    "Laravel",
    "Ruby on Rails",
    "ASP.NET",
    "Phoenix",
    "Gin",
    "Actix",
    "Axum",
    // Languages
    "JavaScript",
    "TypeScript",
    "Python",
    "Java",
    "C#",
    "C++",
    "Go",
    "Rust",
    "PHP",
    "Ruby",
    "Swift",
    "Kotlin",
    "Dart",
    "Scala",
    "Elixir",
    "Haskell",
    // Databases
    "PostgreSQL",
    "MySQL",
    "MongoDB",
    "Redis",
    "SQLite",
    "MariaDB",
    "Cassandra",
    "DynamoDB",
    "Neo4j",
    // Cloud and DevOps
    "AWS",
    "Azure",
    "GCP",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Ansible",
    "Jenkins",
    "GitHub Actions",
    "Heroku",
    "Vercel",
    "Netlify",
    // Mobile
    "React Native",
    "Flutter",
    "Ionic",
    // Styling
    "CSS",
    "Sass",
    "TailwindCSS",
    "Tailwind CSS",
    "Bootstrap",
    "Material-UI",
    "Chakra UI",
    // Build tools
    "Webpack",
    "Vite",
    "Rollup",
    "Babel",
    "ESLint",
    "PostCSS",
    // Testing
    "Jest",
    "Mocha",
    "Cypress",
    "Playwright",
    "Selenium",
    "Vitest",
    // State management and APIs
    "Redux",
    "GraphQL",
    "gRPC",
    "WebSocket",
    "Socket.io",
    "Prisma",
    "Mongoose",
    "Sequelize",
    // Blockchain
    "Solidity",
    "Web3",
    "Ethereum",
    "Blockchain",
    "Smart Contracts",
    "Motoko",
    // AI and ML
    "TensorFlow",
    "PyTorch",
    "Scikit-learn",
    "Pandas",
    "NumPy",
    "OpenAI",
    "Hugging Face",
    "LangChain",
    "OpenCV",
];

/// The two detection tables, bundled so coverage can be extended at
/// construction time without touching the pipeline.
#[derive(Debug, Clone)]
pub struct TechLexicon {
    file_tech: Vec<(String, String)>,
    text_tech: Vec<String>,
}

impl Default for TechLexicon {
    fn default() -> Self {
        Self {
            file_tech: FILE_TECH
                .iter()
                .map(|(f, t)| (f.to_string(), t.to_string()))
                .collect(),
            text_tech: TEXT_TECH.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TechLexicon {
    /// Add custom entries on top of the seeded tables.
    pub fn extend<F, T>(&mut self, files: F, keywords: T)
    where
        F: IntoIterator<Item = (String, String)>,
        T: IntoIterator<Item = String>,
    {
        self.file_tech.extend(files);
        self.text_tech.extend(keywords);
    }

    /// Derive a tech-stack list from detected languages and root filenames.
    ///
    /// Languages lead (the primary language comes first when the caller
    /// sorted them), filename-derived entries follow in table order.
    /// Insertion-ordered, case-insensitively deduplicated.
    pub fn infer_tech_stack_from_files(
        &self,
        file_names: &[String],
        languages: &[String],
    ) -> Vec<String> {
        let mut stack: Vec<String> = Vec::new();
        for lang in languages {
            push_unique(&mut stack, lang);
        }
        for name in file_names {
            let basename = name.rsplit('/').next().unwrap_or(name).to_lowercase();
            for (file, tech) in &self.file_tech {
                if basename == *file {
                    push_unique(&mut stack, tech);
                }
            }
        }
        stack
    }

    /// Scan free text for known technology names (whole-word,
    /// case-insensitive). A fallback signal, not a source of truth.
    pub fn extract_keywords_from_text(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        let mut found: Vec<String> = Vec::new();
        for keyword in &self.text_tech {
            if contains_whole_word(&haystack, &keyword.to_lowercase()) {
                push_unique(&mut found, keyword);
            }
        }
        found
    }
}

/// Append preserving insertion order; duplicates compared case-insensitively,
/// first spelling wins.
pub fn push_unique(stack: &mut Vec<String>, candidate: &str) {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return;
    }
    if !stack.iter().any(|s| s.eq_ignore_ascii_case(candidate)) {
        stack.push(candidate.to_string());
    }
}

/// Whole-word containment: the match may not touch an adjacent ASCII
/// alphanumeric character. Both sides must already be lowercased.
fn contains_whole_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let begin = start + pos;
        let end = begin + needle.len();
        let left_ok = begin == 0
            || !haystack[..begin]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        start = end;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_from_filenames_and_languages() {
        let lexicon = TechLexicon::default();
        let stack = lexicon.infer_tech_stack_from_files(
            &strings(&["package.json", "Dockerfile", "next.config.js", "README.md"]),
            &strings(&["TypeScript", "CSS"]),
        );
        assert_eq!(stack, strings(&["TypeScript", "CSS", "Node.js", "Docker", "Next.js"]));
    }

    #[test]
    fn filename_match_is_case_insensitive_on_basename() {
        let lexicon = TechLexicon::default();
        let stack = lexicon
            .infer_tech_stack_from_files(&strings(&["docker/Dockerfile", "CARGO.TOML"]), &[]);
        assert_eq!(stack, strings(&["Docker", "Rust"]));
    }

    #[test]
    fn dedupes_languages_against_file_hits() {
        let lexicon = TechLexicon::default();
        let stack = lexicon
            .infer_tech_stack_from_files(&strings(&["cargo.toml"]), &strings(&["Rust"]));
        assert_eq!(stack, strings(&["Rust"]));
    }

    #[test]
    fn extracts_whole_word_keywords() {
        let lexicon = TechLexicon::default();
        let found =
            lexicon.extract_keywords_from_text("A Django app with PostgreSQL and redis caching");
        assert_eq!(found, strings(&["Django", "PostgreSQL", "Redis"]));
    }

    #[test]
    fn does_not_match_inside_words() {
        let lexicon = TechLexicon::default();
        // "gopher" must not register as Go, "expressive" must not be Express.
        let found = lexicon.extract_keywords_from_text("an expressive gopher mascot");
        assert!(found.is_empty());
    }

    #[test]
    fn lexicon_is_extensible() {
        let mut lexicon = TechLexicon::default();
        lexicon.extend(
            [("justfile".to_string(), "Just".to_string())],
            ["Zig".to_string()],
        );
        let stack = lexicon.infer_tech_stack_from_files(&strings(&["Justfile"]), &[]);
        assert_eq!(stack, strings(&["Just"]));
        assert_eq!(
            lexicon.extract_keywords_from_text("rewritten in zig"),
            strings(&["Zig"])
        );
    }

    #[test]
    fn push_unique_keeps_first_spelling() {
        let mut stack = strings(&["python"]);
        push_unique(&mut stack, "Python");
        push_unique(&mut stack, "Go");
        assert_eq!(stack, strings(&["python", "Go"]));
    }
}
