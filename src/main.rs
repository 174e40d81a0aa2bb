//! scaffold's main application entry point.
//! Parses arguments, collects answers and drives the render.

use scaffold::{
    cli::{format_error, get_args, Args},
    error::{Error, Result},
    fsast::Node,
    logger::init_logger,
    parser::{get_answers, get_preset, load_from_stdin, merge_answers, parse_var},
    processor::{render_rwfs, RenderContext},
    project::{Options, Project},
    prompt::DialoguerPrompter,
    renderer::{MiniJinjaRenderer, TemplateRenderer},
    rwfs::{MemoryFs, OsFs, WriteFs},
    vars::{build_vars, Vars},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        eprintln!("{}", format_error(&err));
        std::process::exit(1);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the template project and its descriptor
/// 2. Collects preloaded answers (stdin, preset, `--var`)
/// 3. Asks the remaining questions
/// 4. Builds the variable bindings
/// 5. Renders into the output directory, or into memory for `--snapshot`
fn run(args: Args) -> Result<()> {
    let source = OsFs::new(&args.template);
    let mut project = Project::load(&source, Options { no_clobber: args.no_clobber })?;
    let mut engine = MiniJinjaRenderer::new();
    let prompter = DialoguerPrompter::new();

    if !project.config.messages.pre.is_empty() {
        println!("{}", project.config.messages.pre.trim_end());
    }

    let stdin = if args.stdin { load_from_stdin()? } else { Vars::new() };
    let preset = match &args.preset {
        Some(name) => get_preset(&project, name)?,
        None => Vars::new(),
    };
    let cli_vars = args.vars.iter().map(|raw| parse_var(raw)).collect::<Result<Vec<_>>>()?;
    let preloaded = merge_answers(stdin, preset, cli_vars);

    let answers = get_answers(&engine, &prompter, &mut project, args.name, preloaded)?;
    let vars = build_vars(&engine, &project.name, &project.config, answers)?;

    if args.snapshot {
        let dest = MemoryFs::new();
        render(&mut engine, &source, &dest, &project, &vars)?;
        print!("{}", Node::build(&dest, "")?);
        return Ok(());
    }

    std::fs::create_dir_all(&args.output_dir)
        .map_err(|e| Error::fs(args.output_dir.display().to_string(), e))?;
    let dest = OsFs::new(&args.output_dir);
    render(&mut engine, &source, &dest, &project, &vars)?;

    if !project.config.messages.post.is_empty() {
        let post = engine.render(&project.config.messages.post, &vars)?;
        println!("{}", post.trim_end());
    }

    println!("Project generated in {}.", args.output_dir.display());
    Ok(())
}

fn render(
    engine: &mut MiniJinjaRenderer,
    source: &OsFs,
    dest: &dyn WriteFs,
    project: &Project,
    vars: &Vars,
) -> Result<()> {
    let ctx = RenderContext { source, dest, project };
    render_rwfs(engine, &ctx, vars)
}
