//! Extract command - propose transaction fields from one receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use tracing::debug;

use fintrack_core::{
    AmountSource, DateSource, ExtractedFields, ReceiptExtraction, ReceiptExtractor,
    TextRecognizer,
};

use super::{clock, load_recognizer, needs_ocr, open_upload, read_receipt_text, Context, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Receipt file (PDF, image or text), or `-` for text on stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Date to use when the receipt has none (YYYY-MM-DD)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Explain how the total and date were chosen
    #[arg(long)]
    explain: bool,

    /// Print the recognized text
    #[arg(long)]
    show_raw: bool,
}

pub async fn run(args: ExtractArgs, ctx: &Context) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = ctx.load_config()?;

    let upload = open_upload(&args.input)?;
    let engine = if needs_ocr(upload.kind) {
        load_recognizer(&config.ocr)
    } else {
        None
    };
    let raw_text = read_receipt_text(
        &upload,
        &config,
        engine.as_ref().map(|e| e as &dyn TextRecognizer),
    )?;

    if args.show_raw {
        eprintln!("{}", style("Recognized text:").bold());
        eprintln!("{}", raw_text);
        eprintln!();
    }

    let clock = clock(args.today);
    let extraction = ReceiptExtractor::with_clock(clock.as_ref()).extract(&raw_text);

    for warning in &extraction.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    if args.explain {
        eprint!("{}", format_explanation(&extraction));
    }

    let output = format_fields(&extraction.fields, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_fields(fields: &ExtractedFields, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(fields)?),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_csv(fields: &ExtractedFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["total_amount", "transaction_date", "category", "description", "type"])?;
    wtr.write_record([
        &fields.total_amount.map(|a| a.to_string()).unwrap_or_default(),
        &fields.transaction_date.to_string(),
        &fields.category,
        &fields.description,
        &fields.transaction_type.to_string(),
    ])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn format_text(fields: &ExtractedFields) -> String {
    let mut output = String::new();

    let total = fields
        .total_amount
        .map(|a| format!("${:.2}", a))
        .unwrap_or_else(|| "(not found)".to_string());

    output.push_str(&format!("Total:       {}\n", total));
    output.push_str(&format!("Date:        {}\n", fields.transaction_date));
    output.push_str(&format!("Type:        {}\n", fields.transaction_type));
    if !fields.category.is_empty() {
        output.push_str(&format!("Category:    {}\n", fields.category));
    }
    output.push_str(&format!("Description: {}", fields.description));

    output
}

fn format_explanation(extraction: &ReceiptExtraction) -> String {
    let mut output = String::new();

    let amount = match &extraction.amount_source {
        AmountSource::Labeled { line } => format!("total line \"{}\"", line.trim()),
        AmountSource::Summed { count } => format!("sum of {} amounts", count),
        AmountSource::Overflowed { count } => format!("{} amounts too large to sum", count),
        AmountSource::NotFound => "no amounts found".to_string(),
    };
    let date = match &extraction.date_source {
        DateSource::Parsed { text } => format!("parsed \"{}\"", text),
        DateSource::Unparsable { text } => format!("\"{}\" is invalid, defaulted to today", text),
        DateSource::Defaulted => "defaulted to today".to_string(),
    };

    output.push_str(&format!("{} Amount: {}\n", style("ℹ").blue(), amount));
    if !extraction.candidates.is_empty() {
        let candidates: Vec<String> = extraction.candidates.iter().map(|c| c.to_string()).collect();
        output.push_str(&format!("  candidates: {}\n", candidates.join(", ")));
    }
    output.push_str(&format!("{} Date: {}\n", style("ℹ").blue(), date));

    output
}
