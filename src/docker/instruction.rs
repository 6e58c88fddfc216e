//! Typed representation of Dockerfile directives.

/// One Dockerfile directive.
///
/// The subset emitted when generating assignment environment images.
/// Rendering is exhaustive per variant, so adding a directive is a
/// compile-visible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `FROM <image>`
    From(String),
    /// `COPY <src> <dest>`
    Copy { src: String, dest: String },
    /// `RUN <command>`
    Run(String),
    /// `ENV <key> <value>`
    Env { key: String, value: String },
    /// `WORKDIR <dir>`
    Workdir(String),
    /// `EXPOSE <port>`
    Expose(u16),
    /// `CMD ["arg", ...]` (exec form)
    Cmd(Vec<String>),
}

impl Instruction {
    /// Renders this directive as a single Dockerfile line.
    pub fn render(&self) -> String {
        match self {
            Instruction::From(image) => format!("FROM {image}"),
            Instruction::Copy { src, dest } => format!("COPY {src} {dest}"),
            Instruction::Run(command) => format!("RUN {command}"),
            Instruction::Env { key, value } => format!("ENV {key} {value}"),
            Instruction::Workdir(dir) => format!("WORKDIR {dir}"),
            Instruction::Expose(port) => format!("EXPOSE {port}"),
            Instruction::Cmd(args) => {
                let quoted: Vec<String> = args.iter().map(|a| format!("\"{a}\"")).collect();
                format!("CMD [{}]", quoted.join(", "))
            }
        }
    }
}

/// Renders an instruction sequence as Dockerfile text.
///
/// Lines are newline-joined with a trailing newline; an empty sequence
/// renders as the empty string, which downstream stages read as "no new
/// layer required".
pub fn render_instructions(instructions: &[Instruction]) -> String {
    if instructions.is_empty() {
        return String::new();
    }
    let mut text = instructions
        .iter()
        .map(Instruction::render)
        .collect::<Vec<_>>()
        .join("\n");
    text.push('\n');
    text
}
