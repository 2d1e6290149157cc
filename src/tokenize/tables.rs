//! Frozen token tables for the two BASIC dialects, indexed by `byte - 0x80`.
//!
//! Grounded verbatim on `original_source/Tools/Acorn2Txt/acorn2txt.cpp`'s
//! `TokenTable6502`/`TokenTable68k`. Both tables cover the full `0x80..=0xFF`
//! range (128 entries each); `None` entries are intentional sentinels:
//! 6502 `0x8D` (line-number token) and 68k `0xFD`/`0xFE`/`0xFF`
//! (reserved/cached-target tokens) are handled by dedicated code paths in
//! [`super::process_line`], never by a table lookup.

pub const TOKENS_6502: [Option<&str>; 128] = [
    Some("AND"), Some("DIV"), Some("EOR"), Some("MOD"), Some("OR"), Some("ERROR"),
    Some("LINE"), Some("OFF"), Some("STEP"), Some("SPC"), Some("TAB("), Some("ELSE"),
    Some("THEN"), None /* 0x8D line number */, Some("OPENIN"), Some("PTR"),
    Some("PAGE"), Some("TIME"), Some("LOMEM"), Some("HIMEM"), Some("ABS"), Some("ACS"),
    Some("ADVAL"), Some("ASC"), Some("ASN"), Some("ATN"), Some("BGET"), Some("COS"),
    Some("COUNT"), Some("DEG"), Some("ERL"), Some("ERR"), Some("EVAL"), Some("EXP"),
    Some("EXT"), Some("FALSE"), Some("FN"), Some("GET"), Some("INKEY"), Some("INSTR("),
    Some("INT"), Some("LEN"), Some("LN"), Some("LOG"), Some("NOT"), Some("OPENUP"),
    Some("OPENOUT"), Some("PI"), Some("POINT("), Some("POS"), Some("RAD"), Some("RND"),
    Some("SGN"), Some("SIN"), Some("SQR"), Some("TAN"), Some("TO"), Some("TRUE"),
    Some("USR"), Some("VAL"), Some("VPOS"), Some("CHR$"), Some("GET$"), Some("INKEY$"),
    Some("LEFT$("), Some("MID$("), Some("RIGHT$("), Some("STR$"), Some("STRING$("),
    Some("EOF"), Some("AUTO"), Some("DELETE"), Some("LOAD"), Some("LIST"), Some("NEW"),
    Some("OLD"), Some("RENUMBER"), Some("SAVE"), Some("EDIT"), Some("PTR"), Some("PAGE"),
    Some("TIME"), Some("LOMEM"), Some("HIMEM"), Some("SOUND"), Some("BPUT"), Some("CALL"),
    Some("CHAIN"), Some("CLEAR"), Some("CLOSE"), Some("CLG"), Some("CLS"), Some("DATA"),
    Some("DEF"), Some("DIM"), Some("DRAW"), Some("END"), Some("ENDPROC"), Some("ENVELOPE"),
    Some("FOR"), Some("GOSUB"), Some("GOTO"), Some("GCOL"), Some("IF"), Some("INPUT"),
    Some("LET"), Some("LOCAL"), Some("MODE"), Some("MOVE"), Some("NEXT"), Some("ON"),
    Some("VDU"), Some("PLOT"), Some("PRINT"), Some("PROC"), Some("READ"), Some("REM"),
    Some("REPEAT"), Some("REPORT"), Some("RESTORE"), Some("RETURN"), Some("RUN"),
    Some("STOP"), Some("COLOUR"), Some("TRACE"), Some("UNTIL"), Some("WIDTH"), Some("OSCLI"),
];

pub const TOKENS_68K: [Option<&str>; 128] = [
    Some("AUTO"), Some("BPUT"), Some("COLOUR"), Some("CLEAR"), Some("CLOSE"), Some("CLS"),
    Some("CLG"), Some("CALL"), Some("CHAIN"), Some("DELETE"), Some("DRAW"), Some("DATA"),
    Some("DEF"), Some("DIM"), Some("ENVELOPE"), Some("ENDPROC"), Some("END"), Some("ELSE"),
    Some("ERROR"), Some("FOR"), Some("GOTO"), Some("GOSUB"), Some("GCOL"), Some("INPUT"),
    Some("IF"), Some("LIST"), Some("LOAD"), Some("LOCAL"), Some("LET"), Some("LINE"),
    Some("MODE"), Some("MOVE"), Some("NEXT"), Some("NEW"), Some("OLD"), Some("ON"),
    Some("OFF"), Some("OSCLI"), Some("PRINT"), Some("PROC"), Some("PLOT"), Some("REPEAT"),
    Some("RETURN"), Some("RESTORE"), Some("REPORT"), Some("REM"), Some("READ"), Some("RUN"),
    Some("RENUMBER"), Some("STEP"), Some("SAVE"), Some("STOP"), Some("SOUND"), Some("SPC"),
    Some("TRACE"), Some("THEN"), Some("TAB("), Some("UNTIL"), Some("VDU"), Some("WIDTH"),
    Some("AND"), Some("OR"), Some("EOR"), Some("DIV"), Some("MOD"), Some("<="), Some("<>"),
    Some(">="), Some("PTR"), Some("PAGE"), Some("TOP"), Some("LOMEM"), Some("HIMEM"),
    Some("TIME"), Some("CHR$"), Some("GET$"), Some("INKEY$"), Some("LEFT$("), Some("MID$("),
    Some("RIGHT$("), Some("STR$"), Some("STRING$("), Some("INSTR("), Some("VAL"), Some("ASC"),
    Some("LET"), Some("GET"), Some("INKEY"), Some("ADVAL"), Some("POS"), Some("VPOS"),
    Some("COUNT"), Some("POINT("), Some("ERR"), Some("ERL"), Some("OPENIN"), Some("OPENOUT"),
    Some("OPENUP"), Some("EXT"), Some("BGET#"), Some("EOF"), Some("TRUE"), Some("FALSE"),
    Some("ABS"), Some("ACS"), Some("ASN"), Some("ATN"), Some("COS"), Some("DEG"), Some("EVAL"),
    Some("EXP"), Some("FN"), Some("INT"), Some("LN"), Some("LOG"), Some("NOT"), Some("PI"),
    Some("RAD"), Some("RND"), Some("SGN"), Some("SIN"), Some("SQR"), Some("TAN"), Some("USR"),
    Some("TO"), None /* 0xFD reserved */, None /* 0xFE reserved */, None /* 0xFF cached target */,
];
