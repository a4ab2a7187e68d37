use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use typebridge_core::cdecl::TypeNameMap;
use typebridge_core::decl::{DeclContextId, DeclItem, DeclTree};
use typebridge_core::dwarf::DebugImage;
use typebridge_core::introspect::{ChildInfo, ChildOptions};
use typebridge_core::memory::MemorySnapshot;
use typebridge_core::{Address, TypeBridgeError, TypeId, TypeStore};
use typebridge_utils::{
    default_log_file, info, init_file_logging, init_logging, init_logging_with_level, LogFormat, LogLevel, WorkerGuard,
};

/// Inspect the types in a binary's debug info the way a debugger sees them.
#[derive(Parser, Debug)]
#[command(name = "typebridge")]
#[command(version)]
#[command(about = "Inspect DWARF types the way a debugger's expression evaluator sees them", long_about = None)]
struct Cli
{
    /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long, global = true, value_parser = LogLevel::from_str)]
    log_level: Option<LogLevel>,

    /// Write logs to a file instead of the console (dated file in ~/.typebridge if no path)
    #[arg(long, global = true, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List named types with their class and size
    Types
    {
        /// Path to the binary
        binary: PathBuf,
        /// Only show types whose name contains this string
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Describe a type and its children
    Describe
    {
        /// Path to the binary
        binary: PathBuf,
        /// Exact type name
        name: String,
    },
    /// Print the C declaration of a value of a type
    Decl
    {
        /// Path to the binary
        binary: PathBuf,
        /// Exact type name
        name: String,
        /// Variable name to declare
        #[arg(long, default_value = "value")]
        var: String,
    },
    /// Resolve the active variant of an enum value from raw bytes
    Resolve
    {
        /// Path to the binary
        binary: PathBuf,
        /// Exact type name
        name: String,
        /// Bytes of the value in hex (e.g. "01000000 2a000000")
        #[arg(long)]
        bytes: String,
        /// Address the bytes were read from (hex format: 0x1000 or decimal)
        #[arg(long, default_value = "0")]
        address: String,
    },
    /// Print the namespace tree with qualified names
    Namespaces
    {
        /// Path to the binary
        binary: PathBuf,
    },
}

fn main()
{
    process::exit(run());
}

/// Runs the CLI and returns the exit code, dropping the log guard first so
/// buffered file output is written before the process exits
fn run() -> i32
{
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return 1;
        }
    };

    match run_command(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn setup_logging(cli: &Cli) -> Result<Option<WorkerGuard>, typebridge_utils::LoggingError>
{
    match (&cli.log_file, cli.log_level) {
        (Some(path), level) => {
            let path = match path {
                Some(path) => path.clone(),
                None => default_log_file()?,
            };
            let (_, guard) = init_file_logging(path, level)?;
            Ok(Some(guard))
        }
        (None, Some(level)) => init_logging_with_level(level, LogFormat::Pretty),
        (None, None) => init_logging(),
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn std::error::Error>>
{
    match cli.command {
        Commands::Types { binary, filter } => {
            let store = load_store(&binary)?;
            for (id, node) in store.iter() {
                if node.name().is_empty() {
                    continue;
                }
                if filter.as_deref().is_some_and(|wanted| !node.name().contains(wanted)) {
                    continue;
                }
                let size = store
                    .byte_size(id)
                    .map_or_else(|| "?".to_string(), |size| size.to_string());
                println!("{:>12}  {:<12} {size:>6}  {}", id.to_string(), store.type_class(id).to_string(), node.name());
            }
            Ok(())
        }
        Commands::Describe { binary, name } => {
            let store = load_store(&binary)?;
            let id = find_type(&store, &name)?;
            print_type_info(&store, id);
            Ok(())
        }
        Commands::Decl { binary, name, var } => {
            let store = load_store(&binary)?;
            let id = find_type(&store, &name)?;
            let mut names = TypeNameMap::new();
            let declaration = store
                .c_abi_declaration(id, &var, &mut names)
                .ok_or_else(|| TypeBridgeError::InvalidArgument(format!("{name} has no C declaration")))?;
            print!("{}", names.typedefs());
            println!("{declaration};");
            Ok(())
        }
        Commands::Resolve {
            binary,
            name,
            bytes,
            address,
        } => {
            let image = DebugImage::open(&binary)?;
            let store = image.load_types()?;
            let id = find_type(&store, &name)?;
            let address = parse_address(&address)?;
            let memory = MemorySnapshot::new(address, parse_hex_bytes(&bytes)?, image.endian());

            let value = store.resolve_dynamic_type(id, address, &memory)?;
            println!("Static type:  {}", store.type_name(id).unwrap_or_default());
            println!("Dynamic type: {}", store.type_name(value.ty).unwrap_or_default());
            println!("Address:      {}", value.address);
            println!();
            println!("{}", store.describe_type(value.ty));
            Ok(())
        }
        Commands::Namespaces { binary } => {
            let store = load_store(&binary)?;
            let decls = store.decls();
            print_context(decls, decls.translation_unit(), 0);
            Ok(())
        }
    }
}

fn load_store(binary: &Path) -> Result<TypeStore, TypeBridgeError>
{
    info!("Loading debug info from {}", binary.display());
    let store = DebugImage::open(binary)?.load_types()?;
    info!("Loaded {} types", store.len());
    Ok(store)
}

fn find_type(store: &TypeStore, name: &str) -> Result<TypeId, TypeBridgeError>
{
    let matches = store.find_types_by_name(name);
    match matches.as_slice() {
        [] => Err(TypeBridgeError::InvalidArgument(format!("no type named {name}"))),
        [only] => Ok(*only),
        [first, ..] => {
            info!("{} types named {name}, using {first}", matches.len());
            Ok(*first)
        }
    }
}

fn print_type_info(store: &TypeStore, id: TypeId)
{
    println!("{}", store.describe_type(id));
    println!();
    println!("  Class: {}", store.type_class(id));
    println!("  Format: {}", store.format(id));
    if let Some(size) = store.byte_size(id) {
        println!("  Size: {size} bytes");
    }
    if let Some((offset, size)) = store.enum_discriminant_location(id) {
        println!("  Discriminant: {size} bytes at +{offset}");
    }

    let children = describe_children(store, id);
    if !children.is_empty() {
        println!("  Children:");
    }
    for (index, child) in children {
        println!(
            "    [{index}] {:<16} +{:<6} {:>6}  {}",
            child.name,
            child.byte_offset,
            child.byte_size,
            store.type_name(child.ty).unwrap_or("<unknown>")
        );
    }
}

/// Children listed by `describe`; a pointer to an aggregate lists the pointee's fields
fn describe_children(store: &TypeStore, id: TypeId) -> Vec<(usize, ChildInfo)>
{
    let name = store.type_name(id).unwrap_or_default();
    let options = ChildOptions {
        transparent_pointers: true,
        ..ChildOptions::default()
    };
    (0..store.num_children(id, false))
        .filter_map(|index| store.child_at_index(id, index, name, options).map(|child| (index, child)))
        .collect()
}

fn print_context(decls: &DeclTree, context: DeclContextId, depth: usize)
{
    for (name, item) in decls.children(context) {
        let indent = "  ".repeat(depth);
        match item {
            DeclItem::Context(inner) => {
                println!("{indent}{name}  ({})", decls.qualified_name(inner));
                print_context(decls, inner, depth + 1);
            }
            DeclItem::Decl(decl) => match decls.decl_demangled_name(decl) {
                Some(demangled) => println!("{indent}fn {name}  [{demangled}]"),
                None => println!("{indent}fn {name}"),
            },
        }
    }
}

/// Parse an address in hex (`0x` prefix) or decimal
fn parse_address(text: &str) -> Result<Address, TypeBridgeError>
{
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed
        .map(Address::new)
        .map_err(|err| TypeBridgeError::InvalidArgument(format!("invalid address {text}: {err}")))
}

/// Decode hex digits into bytes, ignoring whitespace and an optional `0x`
fn parse_hex_bytes(text: &str) -> Result<Vec<u8>, TypeBridgeError>
{
    let digits: String = text
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        return Err(TypeBridgeError::InvalidArgument(format!(
            "expected an even number of hex digits in {text}"
        )));
    }
    (0..digits.len())
        .step_by(2)
        .map(|start| {
            u8::from_str_radix(&digits[start..start + 2], 16)
                .map_err(|err| TypeBridgeError::InvalidArgument(format!("invalid hex byte in {text}: {err}")))
        })
        .collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_hex_bytes()
    {
        assert_eq!(parse_hex_bytes("01 00 00 00").unwrap(), vec![1, 0, 0, 0]);
        assert_eq!(parse_hex_bytes("0x2a_ff").unwrap(), vec![0x2a, 0xff]);
        assert!(parse_hex_bytes("abc").is_err());
        assert!(parse_hex_bytes("zz").is_err());
    }

    #[test]
    fn test_describe_children_through_pointer()
    {
        let mut store = TypeStore::new(8);
        let i32_ty = store.create_intrinsic_integral_type(true, 4);
        let mut point = store.create_struct_type("Point", 8, false);
        point.add_field("x", i32_ty, 0).add_field("y", i32_ty, 4);
        let point = store.finish(point);
        let point_ptr = store.pointer_type_to(point);
        let int_ptr = store.pointer_type_to(i32_ty);

        let names: Vec<String> = describe_children(&store, point_ptr)
            .into_iter()
            .map(|(_, child)| child.name)
            .collect();
        assert_eq!(names, vec!["x", "y"]);

        let deref = describe_children(&store, int_ptr);
        assert_eq!(deref.len(), 1);
        assert!(deref[0].1.name.starts_with('*'));
        assert!(deref[0].1.is_deref_of_parent);
    }

    #[test]
    fn test_parse_address()
    {
        assert_eq!(parse_address("0x1000").unwrap(), Address::new(0x1000));
        assert_eq!(parse_address("4096").unwrap(), Address::new(4096));
        assert!(parse_address("0xfoo").is_err());
    }
}
