/*!

This is the long-form manual for `cef_scoring` and `cefboard`.

## Input formats

The survey exports come from a forms tool (Microsoft Forms, Google Forms) and are read
either from Excel (`.xlsx`) or from CSV files. Every submission answers the 36 questions of
the CEF self-assessment with one of the following answers:

| answer              | score |
|---------------------|-------|
| `YES`               | 1     |
| `Neither YES or NO` | 0.5   |
| `NO`                | 0     |

The answers are case-sensitive. Any other answer (including an empty cell) is missing.

The following layouts are supported:
* `headerText` one table, the columns are found from the header
* `stackedSections` multiple tables in the same sheet, one per period
* `positional` one table, the columns are at fixed positions

By default (`auto`), a sheet in which the `Full Name` header appears multiple times, or
below the first row, is read as `stackedSections`, and any other sheet as `headerText`.

### `headerText`

The first row is the header. It starts with the metadata columns (timestamp, email, id,
name, last modified time...). Among them, the respondent column is the first one whose header
contains `name` (but not `email`), the time column is the first one whose header contains
`time`. Both are required. The 36 question columns are the columns that follow the metadata,
so a question may mention a name or a time in its text.

```text
Timestamp,Email Address,Full Name,Q1,Q2,...,Q36
2024-01-05 10:00:00,jane@example.com,Jane Doe,YES,NO,...,YES
```

The submissions of every respondent are sorted by time: the first one is `Block 1`, the second
one is `Block 2`, and so on. The blocks are numbered independently for each respondent.

### `stackedSections`

The sheet contains one table per period. Each table starts with a header row that contains a
`Full Name` column:

```text
Full Name,Q1,Q2,...,Q36
Jane Doe,YES,NO,...,YES
John Smith,YES,YES,...,NO

Full Name,Q1,Q2,...,Q36
John Smith,YES,YES,...,YES
```

The first table is `Block 1`, the second one `Block 2`, and so on. A respondent that is not in
a table did not complete this block. The time column is optional.

### `positional`

The name column, the time column (optional) and the first question column are given in the
configuration. The 36 question columns are consecutive.

## Scores

* group totals: the 9 groups of 4 consecutive questions (Q1-Q4, Q5-Q8, ...), between 0 and 4
* safeguarding total: questions 20, 22, 30, 33 and 34, between 0 and 5
* block total: the sum of the group totals, between 0 and 36

The color bands of the group totals are:

| band         | group total     |
|--------------|-----------------|
| `strong`     | 3.25 and above  |
| `good`       | 2.51 and above  |
| `developing` | 1.75 and above  |
| `critical`   | below 1.75      |

A safeguarding question answered `YES` is `strong`, `Neither YES or NO` is `developing` and `NO` is `critical`.

By default, a total that includes a missing answer is incomplete: it has no value and no color.
This can be changed with the `missingAnswers` option (`countAsZero`), in which case missing answers
count as `NO`.

## Configuration

`cefboard` accepts a configuration file in JSON:

```json
{
  "outputSettings": {
    "reportName": "CEF self-assessment 2024",
    "outputDirectory": "out",
    "generateActionPlans": true
  },
  "inputSource": {
    "provider": "xlsx",
    "filePath": "survey.xlsx",
    "excelWorksheetName": "Form1",
    "layout": "auto"
  },
  "rubric": {
    "missingAnswers": "propagate"
  }
}
```

`inputSource`:
 - `provider` (`xlsx` or `csv`)
 - `filePath`: relative to the configuration file
 - `excelWorksheetName` (optional): mandatory if the workbook has more than one worksheet
 - `layout` (optional): `auto`, `headerText`, `stackedSections` or `positional`
 - `nameColumnIndex`, `timeColumnIndex`, `firstQuestionColumnIndex`: for the `positional` layout.
   Numbers starting at 1 or spreadsheet letters (`A`, `B`, ..., `AA`).

`rubric` (optional):
 - `groupLabels`: the 9 labels of the groups
 - `questionLabels`: the 36 labels of the questions
 - `missingAnswers`: `propagate` (default) or `countAsZero`

 */
