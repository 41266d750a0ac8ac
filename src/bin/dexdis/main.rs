use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::warn;
use memmap2::Mmap;
use serde::Serialize;

use dexdis::dalvik::dex::{DexClassDef, DexFile, FlagContext};
use dexdis::smali::SmaliWrite;

#[derive(Parser)]
#[command(name = "dexdis", about = "Dalvik executable parser and Smali disassembler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Disassemble a dex file into one .smali file per class.
    Disas {
        /// Dex file to disassemble.
        dex: PathBuf,

        /// Directory to write output to.
        #[arg(short, default_value = "out")]
        out_dir: PathBuf,

        /// Stop on the first disassembly error instead of resynchronizing.
        #[arg(short = 't')]
        strict: bool,
    },

    /// Print header fields and pool counts.
    Info {
        /// Dex file to inspect.
        dex: PathBuf,
    },

    /// Dump a JSON summary of the parsed model.
    Dump {
        /// Dex file to dump.
        dex: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Disas {
            dex,
            out_dir,
            strict,
        } => disas(&dex, &out_dir, strict),
        Command::Info { dex } => info(&dex),
        Command::Dump { dex } => dump(&dex),
    }
}

fn open(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    // Read-only map of an immutable input.
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mapping {}", path.display()))?;
    Ok(mmap)
}

fn disas(dex_path: &Path, out_dir: &Path, strict: bool) -> Result<()> {
    let data = open(dex_path)?;
    let df = DexFile::parse(&data).context("parsing dex container")?;

    for class in df.class_defs() {
        let path = match class_output_path(out_dir, class) {
            Some(path) => path,
            None => {
                warn!(
                    "class type {} is not a class descriptor, skipping",
                    class.class_type
                );
                continue;
            }
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut out = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        out.write_class(&df, class, strict)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

/// `Lcom/example/Foo;` maps to `<out>/com/example/Foo.smali`.
fn class_output_path(out_dir: &Path, class: &DexClassDef) -> Option<PathBuf> {
    let descriptor = &class.class_type.descriptor;
    let inner = descriptor.strip_prefix('L')?.strip_suffix(';')?;
    if inner.is_empty() || inner.split('/').any(|part| part.is_empty() || part == "..") {
        return None;
    }
    let mut path = out_dir.to_path_buf();
    for part in inner.split('/') {
        path.push(part);
    }
    path.set_extension("smali");
    Some(path)
}

fn info(dex_path: &Path) -> Result<()> {
    let data = open(dex_path)?;
    let df = DexFile::parse(&data).context("parsing dex container")?;
    let header = df.header();

    println!("version:        {}", header.version());
    println!("endianness:     {:?}", df.endianness());
    println!("file size:      {}", header.file_size);
    println!("checksum:       {:#010x}", header.checksum);
    println!("data section:   {:#x}..{:#x}", header.data_off, header.data_off + header.data_size);
    println!("strings:        {}", df.strings().len());
    println!("types:          {}", df.types().len());
    println!("prototypes:     {}", df.protos().len());
    println!("fields:         {}", df.fields().len());
    println!("methods:        {}", df.methods().len());
    println!("method handles: {}", df.method_handles().len());
    println!("call sites:     {}", df.call_site_offs().len());
    println!("classes:        {}", df.class_defs().len());
    Ok(())
}

#[derive(Serialize)]
struct MethodSummary {
    name: String,
    signature: String,
    access_flags: String,
    registers: u16,
    insns_size: usize,
}

#[derive(Serialize)]
struct ClassSummary {
    class: String,
    access_flags: String,
    superclass: Option<String>,
    interfaces: Vec<String>,
    source_file: Option<String>,
    static_fields: Vec<String>,
    instance_fields: Vec<String>,
    direct_methods: Vec<MethodSummary>,
    virtual_methods: Vec<MethodSummary>,
}

#[derive(Serialize)]
struct DexSummary {
    version: u32,
    strings: usize,
    types: usize,
    prototypes: usize,
    fields: usize,
    methods: usize,
    classes: Vec<ClassSummary>,
}

fn dump(dex_path: &Path) -> Result<()> {
    let data = open(dex_path)?;
    let df = DexFile::parse(&data).context("parsing dex container")?;

    let mut classes = Vec::new();
    for class in df.class_defs() {
        let mut summary = ClassSummary {
            class: class.class_type.to_string(),
            access_flags: render_flags(class, FlagContext::Class)?,
            superclass: class.superclass.as_ref().map(|t| t.to_string()),
            interfaces: class
                .interfaces
                .iter()
                .flat_map(|list| list.iter())
                .map(|t| t.to_string())
                .collect(),
            source_file: class.source_file.as_ref().map(|s| s.to_string()),
            static_fields: Vec::new(),
            instance_fields: Vec::new(),
            direct_methods: Vec::new(),
            virtual_methods: Vec::new(),
        };

        if let Some(class_data) = &class.class_data {
            for field in &class_data.static_fields {
                summary
                    .static_fields
                    .push(format!("{}:{}", field.field.name, field.field.type_));
            }
            for field in &class_data.instance_fields {
                summary
                    .instance_fields
                    .push(format!("{}:{}", field.field.name, field.field.type_));
            }
            for (source, dest) in [
                (&class_data.direct_methods, &mut summary.direct_methods),
                (&class_data.virtual_methods, &mut summary.virtual_methods),
            ] {
                for method in source {
                    dest.push(MethodSummary {
                        name: method.method.name.to_string(),
                        signature: method.method.proto.to_string(),
                        access_flags: method
                            .access_flags
                            .render(FlagContext::Method)?
                            .trim_end()
                            .to_string(),
                        registers: method.code.as_ref().map_or(0, |c| c.registers_size),
                        insns_size: method.code.as_ref().map_or(0, |c| c.insns.len()),
                    });
                }
            }
        }
        classes.push(summary);
    }

    let summary = DexSummary {
        version: df.header().version(),
        strings: df.strings().len(),
        types: df.types().len(),
        prototypes: df.protos().len(),
        fields: df.fields().len(),
        methods: df.methods().len(),
        classes,
    };
    serde_json::to_writer_pretty(std::io::stdout().lock(), &summary)?;
    println!();
    Ok(())
}

fn render_flags(class: &DexClassDef, context: FlagContext) -> Result<String> {
    match class.access_flags.render(context) {
        Ok(rendered) => Ok(rendered.trim_end().to_string()),
        Err(err) => bail!("rendering access flags for {}: {err}", class.class_type),
    }
}
