use clap::Parser;

/// Scores the CEF coach self-assessment surveys and compares them across periods.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON configuration file. For more information about the file format,
    /// read the manual of the cef_scoring crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference summary in JSON format. If provided, cefboard will check that the
    /// computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary will be written in JSON format to the given
    /// location. By default, it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The survey export to read. Setting this option overrides the file
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (csv or xlsx) The type of the input. By default, it is guessed from the file extension.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. It is required
    /// if the workbook has more than one worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (auto, headerText, stackedSections or positional) How the columns are found in the sheet.
    #[clap(long, value_parser)]
    pub layout: Option<String>,

    /// The full name of the coach to report on. By default, all the coaches are reported.
    #[clap(long, value_parser)]
    pub coach: Option<String>,

    /// (number starting at 1) The block to report on. By default, all the blocks are reported.
    #[clap(long, value_parser)]
    pub block: Option<u32>,

    /// (two block numbers) Compares two blocks side by side, for example `--compare 1 3`.
    #[clap(long, value_parser, number_of_values = 2)]
    pub compare: Option<Vec<u32>>,

    /// (directory) If specified, an action plan is written for every completed block.
    #[clap(long, value_parser)]
    pub action_plan_dir: Option<String>,

    /// Missing and unrecognized answers count as NO instead of making the totals incomplete.
    #[clap(long, takes_value = false)]
    pub missing_as_zero: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
