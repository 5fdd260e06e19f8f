//! Diagnostic prompt templates handed to the agent.
//!
//! Each template is plain data: the instruction text with `{placeholder}` slots, plus the
//! ordered list of tools and resources the text tells the agent to use. Keeping the
//! references next to the text lets the registry check that every name actually exists.

/// URI of the resource listing the available wiki documents.
pub const DOCUMENTS_RESOURCE_URI: &str = "documents://available";

/// URI of the resource listing the available code projects.
pub const PROJECTS_RESOURCE_URI: &str = "codebase://projects";

/// A single argument accepted by a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptArgumentSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// A diagnostic instruction template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Name the prompt is registered under.
    pub name: &'static str,
    /// Short human-readable summary.
    pub description: &'static str,
    /// Arguments the prompt accepts, in display order.
    pub arguments: &'static [PromptArgumentSpec],
    /// Template text with `{placeholder}` slots.
    pub body: &'static str,
    /// Tools the text tells the agent to call, in the order it mentions them.
    pub tools: &'static [&'static str],
    /// Resources the text tells the agent to read.
    pub resources: &'static [&'static str],
}

const TICKET_ID_ARGUMENT: PromptArgumentSpec = PromptArgumentSpec {
    name: "ticket_id",
    description: "Integer identifier of the customer ticket.",
    required: true,
};

const PROBLEM_DESCRIPTION_ARGUMENT: PromptArgumentSpec = PromptArgumentSpec {
    name: "problem_description",
    description: "Free-form description of the customer's problem.",
    required: true,
};

const PROJECT_SUBFOLDER_ARGUMENT: PromptArgumentSpec = PromptArgumentSpec {
    name: "project_subfolder",
    description: "Project folder inside the code base that likely holds the relevant code.",
    required: true,
};

const SPECIFIC_FILE_ARGUMENT: PromptArgumentSpec = PromptArgumentSpec {
    name: "specific_file",
    description: "A file the investigation already points at, if any.",
    required: false,
};

/// Guides the agent through the wiki documents for a ticket.
pub const WIKI_DIAGNOSIS: PromptTemplate = PromptTemplate {
    name: "wiki_diagnosis",
    description: "Diagnose a ticket by consulting the wiki documents for its topic.",
    arguments: &[TICKET_ID_ARGUMENT],
    body: r#####"
You are a diagnostic assistant. A customer has reported an issue related to '{topic}' (from ticket ID {ticket_id}).
Your task is to consult the available wiki documents to find a solution or diagnostic steps.

Follow these instructions carefully:
1.  Use the `find_documents` tool with `topic="{topic}"` to find relevant wiki filenames. Review the list of filenames returned.
2.  If relevant wikis are found, select the most promising one(s). For each selected wiki, use the `extract_document` tool with its `filename` to get its content.
3.  Read and analyze the extracted text. Identify key diagnostic procedures, troubleshooting steps, or known solutions related to '{topic}'.
4.  Synthesize the information into a clear, step-by-step action plan that an engineer can follow to resolve the issue.
5.  If multiple wikis offer insights, consolidate them. If procedures conflict, highlight the conflict.
6.  For each step in your action plan, cite the source wiki filename(s) where possible.
7.  If no relevant wikis are found, or they do not provide a clear solution, say so and suggest other investigation paths (escalating, checking logs, or analyzing code).

Present your findings in a structured format with clear headings and bullet points.
"#####,
    tools: &["find_documents", "extract_document"],
    resources: &[],
};

/// Guides the agent through reading and analyzing code for a ticket.
///
/// `{first_step}` is filled with either the listing instruction or the specific file hint.
pub const CODE_ANALYSIS: PromptTemplate = PromptTemplate {
    name: "code_analysis",
    description: "Analyze the code behind a ticket's problem and propose a fix.",
    arguments: &[TICKET_ID_ARGUMENT, PROBLEM_DESCRIPTION_ARGUMENT, PROJECT_SUBFOLDER_ARGUMENT, SPECIFIC_FILE_ARGUMENT],
    body: r#####"
You are a code analysis assistant for a problem related to '{topic}' (from ticket ID {ticket_id}).
The problem description is: "{problem_description}"
The relevant code is expected to be in the project subfolder: `{project_subfolder}`.

Follow these instructions:
1.  {first_step}
2.  Based on the problem description and the list of files (or the specific file provided), identify the most relevant code file(s) to inspect.
3.  For each relevant file, use the `read_code_file` tool with the correct `path` to get its source code.
4.  Once you have the code, use the `analyze_code_snippet` tool. Provide the `code_snippet` (the content you read) and the correct `language` (e.g., "csharp").
    Ask it to:
        a. Explain the functionality of the code in relation to the problem: "{problem_description}".
        b. Identify any potential bugs, logical errors, or areas that might cause the described problem.
        c. Point at the lines or sections that are most relevant.
5.  Based on the analysis, summarize:
        a. What the code does.
        b. Any potential errors or suspicious patterns.
        c. How these relate to the customer's reported problem.
6.  **IMPORTANT**: If the analysis suggests a fix:
        a. Clearly describe the proposed change(s).
        b. **Do NOT write the fixed code unless explicitly instructed to use the save tool in a separate step.**
        c. If you suggest using `write_fixed_code_file`, state the `original_path` and provide the complete `content` to save. Explain why the fix is necessary.

If `analyze_code_snippet` reports that it is a placeholder, acknowledge this and describe the analysis you would perform if it were fully functional.
"#####,
    tools: &["list_code_files", "read_code_file", "analyze_code_snippet", "write_fixed_code_file"],
    resources: &[],
};

/// First step of [`CODE_ANALYSIS`] when no file is known yet.
pub const CODE_ANALYSIS_LIST_STEP: &str = "First, if you don't have a specific file in mind, use `list_code_files` with `subfolder=\"{project_subfolder}\"` to see the available code files (e.g., .cs files).";

/// First step of [`CODE_ANALYSIS`] when the caller already names a file.
pub const CODE_ANALYSIS_FILE_STEP: &str = "The investigation points towards the file `{specific_file}` in project subfolder `{project_subfolder}`.";

/// Guides the agent through the data sources for a ticket.
pub const DATA_INVESTIGATION: PromptTemplate = PromptTemplate {
    name: "data_investigation",
    description: "Investigate whether data issues contribute to a ticket's problem.",
    arguments: &[TICKET_ID_ARGUMENT, PROBLEM_DESCRIPTION_ARGUMENT],
    body: r#####"
You are a data investigation specialist for a problem related to '{topic}' (ticket ID: {ticket_id}).
The customer's problem is: "{problem_description}"

Your goal is to use the available tools to fetch relevant data and determine whether data issues contribute to the problem.

Follow these steps:
1.  **Ticket Review & Initial Hypothesis:**
    * Use `get_customer_ticket_details` with `ticket_id="{ticket_id}"` to understand the specifics.
    * Based on the ticket, form an initial hypothesis about which data is relevant (ad configurations, user activity logs, entity states).

2.  **Ad Data Retrieval (if applicable):**
    * If the problem concerns ad performance or configuration, find any `campaign_id`, `ad_group_id`, or `ad_id` mentioned or inferable.
    * Use `get_ad_data` with the relevant ID(s) to fetch current ad settings.
    * Analyze the ad data: is it misconfigured, inactive, or outside its targeting criteria?

3.  **Log Analysis (Selection/Activity Logs):**
    * If the problem involves system behavior, errors, or unexpected outcomes, fetch selection logs.
    * Use `get_selection_logs` with relevant identifiers (e.g., `complaint_id="{ticket_id}"`, or a `user_id` or `request_id` known from the ticket or ad data).
    * Look for errors, warnings, unexpected values, or missing entries that correlate with the problem.

4.  **Deep Log Analysis (Cloud Logs, if necessary):**
    * If the logs above are inconclusive and the problem is complex, request detailed cloud logs.
    * Use `initiate_cloud_log_download` (e.g., with `customer_request_id` if known). Note the `job_id`.
    * Periodically use `check_cloud_log_download_status` with the `job_id`.
    * Once completed, describe what information you would look for in these logs given the problem.

5.  **Synthesize Data Findings:**
    * Combine insights from all retrieved data sources.
    * Does the data confirm or refute your initial hypothesis?
    * Are there inconsistencies, anomalies, or missing data points that explain the customer's issue?
    * State your conclusions. If the data is inconclusive, specify what additional data or checks are needed.

Present your findings methodically: which tools you used, the key data points retrieved, and your interpretation of that data.
"#####,
    tools: &["get_customer_ticket_details", "get_ad_data", "get_selection_logs", "initiate_cloud_log_download", "check_cloud_log_download_status"],
    resources: &[],
};

/// Walks the agent through a full escalation diagnosis.
pub const COMPREHENSIVE_DIAGNOSIS: PromptTemplate = PromptTemplate {
    name: "comprehensive_diagnosis",
    description: "Run a complete, step-by-step diagnosis of a customer escalation.",
    arguments: &[TICKET_ID_ARGUMENT],
    body: r#####"
You are an expert Ads Escalation Diagnostic Agent.
Your goal is to find the root cause of customer ticket ID {ticket_id}, which concerns '{topic}'.

Follow these steps methodically. For each step, state the tool you are using, its parameters, and a summary of its output.

1.  **Understand the Problem:**
    * Use `get_customer_ticket_details` with `ticket_id="{ticket_id}"` to fetch the complaint.
    * Summarize the customer's problem, what they observed, and their expected outcome.

2.  **Initial Data Gathering:**
    * If the ticket mentions a `campaign_id`, `ad_group_id`, `ad_id`, or `user_id`, use `get_ad_data` to fetch the relevant ad configuration.
    * If applicable, use `get_selection_logs` for an overview of recent activity related to the complaint. Note any obvious errors or warnings.

3.  **Consult the Knowledge Base (Wikis):**
    * Read the resource `documents://available` to see the available diagnostic guides.
    * Identify a relevant wiki for the problem type. You can use `find_documents` with `topic="{topic}"` or another derived topic.
    * Use `extract_document` with the chosen `filename` to get its content.
    * Based on the wiki and the problem description, formulate a step-by-step diagnostic plan.

4.  **Execute the Diagnostic Plan:**
    * Follow the plan. This may involve further calls to `get_ad_data` and `get_selection_logs`.
    * If the plan suggests checking code:
        * Read the resource `codebase://projects` to see the available code projects.
        * Use `list_code_files` to find relevant files in a project.
        * Use `read_code_file` to read specific files.
        * Use `analyze_code_snippet` with the code content to look for issues.

5.  **Deep Dive Log Analysis (if necessary):**
    * If the logs are insufficient, use `initiate_cloud_log_download` with a relevant `customer_request_id`. Note the `job_id`.
    * Periodically use `check_cloud_log_download_status` with the `job_id` until it completes.
    * Describe what you would analyze in these detailed logs.

6.  **Synthesize Findings and Propose a Root Cause:**
    * Combine all gathered information: ticket details, ad data, logs, wiki guidance, and code analysis.
    * State the suspected root cause(s).
    * If a straightforward code fix is identified, describe it. If confident, suggest using `write_fixed_code_file` with the `original_path` and the complete `content`.
    * If the root cause is unclear, list the ambiguities and the next steps for a human engineer.

Provide a detailed report of your investigation, including tool outputs and your reasoning.
"#####,
    tools: &[
        "get_customer_ticket_details",
        "get_ad_data",
        "get_selection_logs",
        "find_documents",
        "extract_document",
        "list_code_files",
        "read_code_file",
        "analyze_code_snippet",
        "initiate_cloud_log_download",
        "check_cloud_log_download_status",
        "write_fixed_code_file",
    ],
    resources: &[DOCUMENTS_RESOURCE_URI, PROJECTS_RESOURCE_URI],
};

/// Every prompt the server exposes, in listing order.
pub const ALL_PROMPTS: &[PromptTemplate] = &[WIKI_DIAGNOSIS, CODE_ANALYSIS, DATA_INVESTIGATION, COMPREHENSIVE_DIAGNOSIS];

/// Looks a template up by its registered name.
pub fn find_prompt(name: &str) -> Option<&'static PromptTemplate> {
    ALL_PROMPTS.iter().find(|prompt| prompt.name == name)
}
