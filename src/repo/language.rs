//! Extension-to-language mapping for file metadata.

use super::path::file_name;

/// Filenames whose language is fixed regardless of extension.
const SPECIAL_FILENAMES: &[(&str, &str)] = &[
    ("Dockerfile", "dockerfile"),
    ("Makefile", "makefile"),
    ("Rakefile", "ruby"),
    ("Gemfile", "ruby"),
    ("CMakeLists.txt", "cmake"),
    ("Vagrantfile", "ruby"),
    ("Justfile", "just"),
];

const EXTENSIONS: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("pyi", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("rb", "ruby"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("scala", "scala"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("php", "php"),
    ("swift", "swift"),
    ("m", "objective-c"),
    ("sh", "shell"),
    ("bash", "shell"),
    ("zsh", "shell"),
    ("fish", "shell"),
    ("ps1", "powershell"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("scss", "scss"),
    ("sass", "scss"),
    ("less", "less"),
    ("vue", "vue"),
    ("svelte", "svelte"),
    ("json", "json"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("xml", "xml"),
    ("md", "markdown"),
    ("markdown", "markdown"),
    ("rst", "restructuredtext"),
    ("txt", "text"),
    ("sql", "sql"),
    ("r", "r"),
    ("lua", "lua"),
    ("pl", "perl"),
    ("pm", "perl"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("erl", "erlang"),
    ("hs", "haskell"),
    ("clj", "clojure"),
    ("elm", "elm"),
    ("dart", "dart"),
    ("zig", "zig"),
    ("proto", "protobuf"),
    ("graphql", "graphql"),
    ("tf", "terraform"),
    ("dockerfile", "dockerfile"),
    ("svg", "xml"),
    ("ini", "ini"),
    ("cfg", "ini"),
    ("env", "dotenv"),
];

/// Detect the language of a file from its name. Special filenames win over
/// extensions; unknown extensions return `None`.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let name = file_name(path);

    for (special, language) in SPECIAL_FILENAMES {
        if name == *special {
            return Some(language);
        }
    }

    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, language)| *language)
}

/// Extensions treated as code/text when deciding whether a token from free
/// text plausibly names a repository file.
pub fn has_code_extension(path: &str) -> bool {
    let name = file_name(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            EXTENSIONS.iter().any(|(e, _)| *e == ext)
        }
        None => false,
    }
}
